//! # Selftest Entry Point
//!
//! Boot sequence of the bare-metal image:
//!
//! 1. [`_start`] switches to 64-bit addressing, loads CR0, sets up the boot
//!    stack and calls [`kernel_entry`].
//! 2. The console logger and the program-interrupt handler are installed.
//! 3. Memory discovery sizes real storage and hands the free part to a
//!    [`PhysArena`].
//! 4. The checks run (the vector ones only when `stfle` reports the vector
//!    facility) and the result leaves through a disabled-wait PSW.

#![no_std]
#![no_main]
#![allow(unsafe_code)]

use core::arch::naked_asm;
use core::fmt;
use kernel_alloc::PhysArena;
use kernel_info::memory::{BOOT_STACK_SIZE, STACK_FRAME_OVERHEAD};
use kernel_interrupts::{LowcoreTraps, ProgramInterruptCode};
use kernel_meminit::{BootContext, Tprot, TrapGuardedProbe};
use kernel_memory_addresses::PhysicalAddress;
use kernel_qemu::QemuLogger;
use kernel_registers::{Cr0, Psw};
use kernel_report::{ExitStatus, FatalAbort, Report};
use kernel_sclp::{Sccb, Servc};
use log::{LevelFilter, error, info};
use selftest::hw::{
    Bfp, RealStorage, VectorRegisters, execute_unassigned_opcode, store_facility_list,
    store_to_highest_address,
};
use selftest::{
    check_arena, check_fp_divide, check_program_interrupt, check_rounding, check_vector,
    exit_status_word,
};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    BOOT_ABORT.abort(format_args!("panic: {}", info.message()))
}

/// Page-aligned stack
#[repr(align(4096))]
struct Aligned<const N: usize>([u8; N]);

#[unsafe(link_section = ".bss.boot")]
#[unsafe(no_mangle)]
static mut BOOT_STACK: Aligned<BOOT_STACK_SIZE> = Aligned([0; BOOT_STACK_SIZE]);

/// SCCB for memory discovery; the console owns a separate one.
#[unsafe(link_section = ".bss.sccb")]
static mut BOOT_SCCB: Sccb = Sccb::new();

/// Control register 0 while the selftest runs; loaded before any Rust code.
static BOOT_CR0: u64 = Cr0::INITIAL.into_bits();

unsafe extern "C" {
    /// End of the image, page aligned. Provided by `selftest.ld`.
    static __image_end: u8;
}

static BOOT_ABORT: BootAbort = BootAbort;

/// Ends the run with the abort status.
struct BootAbort;

impl FatalAbort for BootAbort {
    fn abort(&self, args: fmt::Arguments<'_>) -> ! {
        error!(target: "report", "ABORT: {args}");
        exit(ExitStatus::ABORT)
    }
}

/// The image entry point.
///
/// # Naked function & Stack
/// Nothing is set up on entry: the addressing mode may still be 31-bit and
/// `%r15` is undefined. The stub fixes both and leaves a zeroed back chain
/// plus the register save area the ELF ABI expects below the stack top.
#[unsafe(no_mangle)]
#[unsafe(naked)]
#[unsafe(link_section = ".text.start")]
pub extern "C" fn _start() {
    naked_asm!(
        "sam64",
        "larl %r1, {cr0}",
        "lctlg %c0, %c0, 0(%r1)",
        "larl %r15, {stack}",
        "agfi %r15, {top}",
        "xc 0(8,%r15), 0(%r15)",
        "brasl %r14, {rust_entry}",
        // kernel_entry never returns.
        "j .",
        cr0 = sym BOOT_CR0,
        stack = sym BOOT_STACK,
        top = const BOOT_STACK_SIZE - STACK_FRAME_OVERHEAD,
        rust_entry = sym kernel_entry,
    );
}

/// Rust entry running on the boot stack.
#[unsafe(no_mangle)]
extern "C" fn kernel_entry() -> ! {
    // Without a console there is nobody to tell.
    let _ = QemuLogger::new(LevelFilter::Info).init();

    // SAFETY: the only instance; the prefix register is zero after IPL.
    let mut traps = unsafe { LowcoreTraps::new() };
    // SAFETY: supervisor state, DAT off, and the boot stack is in place.
    unsafe { traps.install(&BOOT_ABORT) };

    let status = selftest_main(&mut traps);
    exit(status)
}

fn selftest_main(traps: &mut LowcoreTraps) -> ExitStatus {
    let mut report = Report::new();
    report.prefix_push("selftest");
    report.report("true", true);

    let free_start = PhysicalAddress::from_ptr(&raw const __image_end);
    let mut arena = PhysArena::new();
    let memory = {
        // SAFETY: nothing else refers to the discovery SCCB.
        let sccb = unsafe { &mut *(&raw mut BOOT_SCCB) };
        let probe = TrapGuardedProbe::new(&mut *traps, Tprot);
        let mut boot = BootContext::new(Servc, sccb, probe, &BOOT_ABORT);
        boot.discover_and_init_memory(&mut arena, free_start)
    };
    info!(
        "storage: {:#x} bytes, free from {} ({:#x} bytes)",
        memory.ram_size,
        memory.free_start,
        memory.free_size()
    );

    let mut fpu = Bfp;
    check_fp_divide(&mut report, &mut fpu);
    check_rounding(&mut report, &mut fpu);

    check_program_interrupt(
        &mut report,
        traps,
        "program interrupt: operation",
        ProgramInterruptCode::OPERATION,
        execute_unassigned_opcode,
    );
    check_program_interrupt(
        &mut report,
        traps,
        "program interrupt: addressing",
        ProgramInterruptCode::ADDRESSING,
        store_to_highest_address,
    );

    let facilities = store_facility_list();
    check_vector(&mut report, &facilities, &mut VectorRegisters, traps);

    check_arena(&mut report, &mut arena, &memory, traps, &mut RealStorage);

    report.summary()
}

/// Print the exit line and stop the CPU.
fn exit(status: ExitStatus) -> ! {
    info!(target: "report", "EXIT: STATUS={}", exit_status_word(status));
    log::logger().flush();
    // SAFETY: a disabled wait never returns.
    unsafe { Psw::disabled_wait(u64::from(status.code())).load() }
}
