use kernel_info::memory;
use std::{env, path::PathBuf};

fn main() {
    // Point to the linker script
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("set by cargo"));
    let ld = manifest_dir.join("selftest.ld");

    // Sanity checks (fail fast during build)
    let load_address = memory::LOAD_ADDRESS;
    let page_size = memory::PAGE_SIZE;
    assert_eq!(
        load_address % page_size,
        0,
        "LOAD_ADDRESS must be page aligned (got {load_address:#x})"
    );
    assert!(
        load_address < memory::STORAGE_INCREMENT_UNIT,
        "LOAD_ADDRESS must lie in the first storage increment (got {load_address:#x})"
    );

    println!("cargo:rerun-if-changed={}", ld.display());

    // The linker script only matters for the bootable image.
    if env::var("CARGO_CFG_TARGET_ARCH").as_deref() != Ok("s390x") {
        return;
    }

    println!("cargo:rustc-link-arg-bins=-T{}", ld.display());
    println!("cargo:rustc-link-arg-bins=-nostartfiles");
    println!("cargo:rustc-link-arg-bins=-static");

    // Provide symbols to the linker script
    // (passed through the gcc driver to ld)
    println!("cargo:rustc-link-arg-bins=-Wl,--defsym=LOAD_ADDRESS={load_address:#x}");
    println!("cargo:rustc-link-arg-bins=-Wl,--defsym=PAGE_SIZE={page_size:#x}");
}
