//! Cortex-M3 port: stack seeding, the time base, and the two naked
//! context-switch handlers.
//!
//! Single MSP stack throughout — no PSP/MSP split. Every thread and the
//! kernel itself run off the same stack pointer register, the way the
//! original C source's `SysTick_Handler` and `osSchedular_Launch`
//! manipulate `SP` directly, because this kernel has no thread-mode vs
//! handler-mode privilege separation to preserve.

#![allow(named_asm_labels)]

use core::arch::naked_asm;

use cortex_m::peripheral::syst::SystClkSource;

use crate::types::{OsStkElement, TaskFn};

/// Number of words in a seeded frame: 8 callee-saved (R4-R11), one `LR`
/// slot carrying the `EXC_RETURN` value the handler must restore before
/// its own `bx lr` (see `SysTick`/`PendSV` below), plus the 8 words a
/// Cortex-M exception entry auto-stacks (R0-R3, R12, LR, PC, xPSR).
const FRAME_WORDS: usize = 17;

/// `EXC_RETURN` value for "return to Thread mode, use MSP, no floating-point
/// context" — the only mode this single-stack port ever returns to.
const EXC_RETURN_THREAD_MSP: u32 = 0xFFFF_FFF9;

/// Sentinel written into the callee-saved slots of a freshly seeded
/// frame, one digit repeated per register (R4 -> 0x44444444, etc), to
/// make an un-run task's register file recognizable in a debugger —
/// mirrors the original C source's approach.
const fn reg_sentinel(n: u32) -> u32 {
    n * 0x1111_1111
}

/// Thumb bit set in the seeded xPSR; Cortex-M never executes ARM mode.
const XPSR_THUMB: u32 = 1 << 24;

/// Build a seeded exception frame at the top of `stack` so that reloading
/// the returned stack pointer and returning from an exception (or, for
/// the very first task, `bootstrap`'s manual unwind) resumes execution at
/// `entry`.
///
/// # Safety
/// `stack` must be live for the lifetime the kernel holds this task, and
/// at least `FRAME_WORDS` long (checked by the caller against
/// `MIN_STACK_WORDS` before this is reached).
pub unsafe fn seed_stack(stack: &mut [OsStkElement], entry: TaskFn) -> *mut OsStkElement {
    let len = stack.len();
    debug_assert!(len >= FRAME_WORDS);
    let frame = &mut stack[len - FRAME_WORDS..];

    frame[0] = reg_sentinel(4); // R4
    frame[1] = reg_sentinel(5); // R5
    frame[2] = reg_sentinel(6); // R6
    frame[3] = reg_sentinel(7); // R7
    frame[4] = reg_sentinel(8); // R8
    frame[5] = reg_sentinel(9); // R9
    frame[6] = reg_sentinel(10); // R10
    frame[7] = reg_sentinel(11); // R11
    frame[8] = EXC_RETURN_THREAD_MSP; // LR register value the handler reloads before `bx lr`
    frame[9] = 0; // R0
    frame[10] = 0; // R1
    frame[11] = 0; // R2
    frame[12] = 0; // R3
    frame[13] = 0; // R12
    frame[14] = task_return as usize as u32; // LR: where a returning task lands
    frame[15] = (entry as usize as u32) | 1; // PC, thumb bit set
    frame[16] = XPSR_THUMB; // xPSR

    frame.as_mut_ptr()
}

/// Where control lands if a task function ever returns, which spec.md
/// treats as a programming error the kernel does not recover from.
extern "C" fn task_return() -> ! {
    loop {
        cortex_m::asm::bkpt();
    }
}

/// Program `SysTick` to fire every `reload` core clock cycles.
pub fn reload_timer(reload: u32) {
    let mut syst = unsafe { cortex_m::Peripherals::steal().SYST };
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(reload.saturating_sub(1));
    syst.clear_current();
    syst.enable_interrupt();
    syst.enable_counter();
}

/// Request a voluntary context switch via `PendSV`.
pub fn trigger_pendsv() {
    cortex_m::peripheral::SCB::set_pendsv();
}

/// Bootstrap the very first task. Not an exception return — there is no
/// real hardware frame to return from yet, so every word of the seeded
/// frame is popped by hand and control is transferred with `bx` instead
/// of relying on exception-return magic. The seeded `EXC_RETURN` slot has
/// no meaning here (there is no exception to return from) and is simply
/// skipped.
///
/// # Safety
/// `sp` must point at a frame built by `seed_stack` that has never been
/// resumed before.
#[unsafe(naked)]
pub unsafe extern "C" fn bootstrap(sp: *mut OsStkElement) -> ! {
    naked_asm!(
        "mov sp, r0",
        "pop {{r4-r11}}",
        "add sp, sp, #4", // skip the seeded EXC_RETURN slot
        "pop {{r0-r3}}",
        "pop {{r12}}",
        "add sp, sp, #4", // skip the seeded LR slot
        "pop {{r3}}",     // seeded PC into a work register
        "add sp, sp, #4", // skip the seeded xPSR slot
        "cpsie i",
        "bx r3",
    )
}

/// `SysTick` exception handler: tick-driven dispatch.
///
/// Spills callee-saves *and* `LR` (the hardware's `EXC_RETURN` value for
/// this exception entry — the `bl` below would otherwise clobber it)
/// onto the outgoing thread's stack, branches into
/// [`crate::kernel::on_tick`] with the outgoing stack pointer in `r0`,
/// reloads from the stack pointer it returns, restores callee-saves and
/// `LR`, and returns from the exception via `bx lr`.
#[unsafe(naked)]
#[no_mangle]
pub unsafe extern "C" fn SysTick() {
    naked_asm!(
        "push {{r4-r11, lr}}",
        "mov r0, sp",
        "bl {on_tick}",
        "mov sp, r0",
        "pop {{r4-r11, lr}}",
        "bx lr",
        on_tick = sym on_tick_trampoline,
    );
}

/// `PendSV` exception handler: voluntary-yield dispatch. Identical shape
/// to `SysTick`, differing only in which policy entry point it calls.
#[unsafe(naked)]
#[no_mangle]
pub unsafe extern "C" fn PendSV() {
    naked_asm!(
        "push {{r4-r11, lr}}",
        "mov r0, sp",
        "bl {on_yield}",
        "mov sp, r0",
        "pop {{r4-r11, lr}}",
        "bx lr",
        on_yield = sym on_yield_trampoline,
    );
}

extern "C" fn on_tick_trampoline(current_sp: *mut OsStkElement) -> *mut OsStkElement {
    crate::core::kernel::on_tick(current_sp)
}

extern "C" fn on_yield_trampoline(current_sp: *mut OsStkElement) -> *mut OsStkElement {
    crate::core::kernel::on_yield(current_sp)
}
