use crate::code::ProgramInterruptCode;
use crate::expect::TrapInterception;
use core::arch::naked_asm;
use core::sync::atomic::{AtomicBool, Ordering, compiler_fence};
use kernel_info::lowcore::{
    PGM_INT_CODE, PGM_INT_ID, PGM_NEW_PSW, PGM_OLD_PSW, SW_INT_FPC, SW_INT_GRS, SW_INT_VRS,
};
use kernel_registers::{Psw, PswMask};
use kernel_report::{ABORT_EXIT_CODE, FatalAbort};
use kernel_sync::SyncOnceCell;

/// Set while a program interrupt is anticipated.
static EXPECTED: AtomicBool = AtomicBool::new(false);

/// Where unexpected program interrupts end up.
static ON_UNEXPECTED: SyncOnceCell<&'static (dyn FatalAbort + Sync)> = SyncOnceCell::new();

#[allow(clippy::cast_possible_truncation)]
const fn lowcore<T>(offset: u64) -> *mut T {
    core::ptr::with_exposed_provenance_mut(offset as usize)
}

/// Trap interception backed by the real lowcore.
///
/// Only one instance may exist; it stands for the CPU's single
/// program-interruption slot.
#[derive(Debug)]
pub struct LowcoreTraps {
    _private: (),
}

impl LowcoreTraps {
    /// # Safety
    /// Call once. The prefix register must be zero so that the lowcore is
    /// reachable at real address 0.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    /// Point the program new PSW at the entry stub.
    ///
    /// Unexpected program interrupts are reported through `abort`.
    ///
    /// # Safety
    /// Supervisor state, DAT off, and a valid stack in `%r15` whenever a
    /// program interrupt can occur.
    pub unsafe fn install(&mut self, abort: &'static (dyn FatalAbort + Sync)) {
        if ON_UNEXPECTED.set(abort).is_err() {
            log::warn!("program interrupt abort target already installed");
        }

        let entry = program_interrupt_entry as usize as u64;
        let psw = Psw::new(PswMask::SIXTY_FOUR_BIT, entry);
        // SAFETY: the program new PSW slot is 16-byte aligned lowcore storage.
        unsafe { lowcore::<Psw>(PGM_NEW_PSW).write_volatile(psw) };
        log::debug!("program new PSW -> {entry:#x}");
    }
}

impl TrapInterception for LowcoreTraps {
    fn expect_trap(&mut self) {
        // SAFETY: see `LowcoreTraps::new`.
        unsafe { lowcore::<u16>(PGM_INT_CODE).write_volatile(0) };
        EXPECTED.store(true, Ordering::SeqCst);
        compiler_fence(Ordering::SeqCst);
    }

    fn take_trap(&mut self) -> Option<ProgramInterruptCode> {
        compiler_fence(Ordering::SeqCst);
        // SAFETY: see `LowcoreTraps::new`.
        let raw = unsafe {
            let slot = lowcore::<u16>(PGM_INT_CODE);
            let raw = slot.read_volatile();
            slot.write_volatile(0);
            raw
        };
        EXPECTED.store(false, Ordering::SeqCst);
        (raw != 0).then_some(ProgramInterruptCode::new(raw))
    }
}

/// First-level program interrupt handler.
///
/// Saves the registers the called Rust handler may clobber into the lowcore
/// save area, runs it on the interrupted stack and resumes at the old PSW.
/// Compiled code may keep values in any vector register, so all 32 are
/// saved; this needs the vector enablement control in CR0.
#[unsafe(naked)]
unsafe extern "C" fn program_interrupt_entry() {
    naked_asm!(
        "stmg %r0,%r15,{grs}",
        "vstm %v0,%v15,{vrs}",
        "vstm %v16,%v31,{vrs}+256",
        "stfpc {fpc}",
        "aghi %r15,-{frame}",
        "brasl %r14,{handler}",
        "lfpc {fpc}",
        "vlm %v0,%v15,{vrs}",
        "vlm %v16,%v31,{vrs}+256",
        "lmg %r0,%r15,{grs}",
        "lpswe {old_psw}",
        grs = const SW_INT_GRS,
        vrs = const SW_INT_VRS,
        fpc = const SW_INT_FPC,
        frame = const kernel_info::memory::STACK_FRAME_OVERHEAD,
        old_psw = const PGM_OLD_PSW,
        handler = sym handle_program_interrupt,
    )
}

extern "C" fn handle_program_interrupt() {
    // SAFETY: the CPU just stored these fields; the lowcore is at real address 0.
    let (code, ilen, old_psw) = unsafe {
        (
            ProgramInterruptCode::new(lowcore::<u16>(PGM_INT_CODE).read_volatile()),
            lowcore::<u16>(PGM_INT_ID).read_volatile(),
            lowcore::<Psw>(PGM_OLD_PSW).read_volatile(),
        )
    };

    if !EXPECTED.swap(false, Ordering::SeqCst) {
        unexpected(code, old_psw.addr(), ilen);
    }

    if code.is_nullifying() {
        let mut resume = old_psw;
        resume.advance(u64::from(ilen));
        // SAFETY: as above.
        unsafe { lowcore::<Psw>(PGM_OLD_PSW).write_volatile(resume) };
    }
}

fn unexpected(code: ProgramInterruptCode, addr: u64, ilen: u16) -> ! {
    log::error!("unexpected {code} at {addr:#x}, ilen {ilen}");
    if let Some(abort) = ON_UNEXPECTED.get() {
        abort.abort(format_args!(
            "Unexpected program interrupt: {:#x} at {addr:#x}, ilen {ilen}",
            code.raw()
        ));
    }
    // Nothing installed to report through; stop with the abort status.
    // SAFETY: a disabled wait never returns.
    unsafe { Psw::disabled_wait(u64::from(ABORT_EXIT_CODE)).load() }
}
