//! A minimal preemptive/periodic/round-robin RTOS kernel for Cortex-M3
//!
//! Provides:
//! - A fixed-size TCB pool and a circular ready-list ring
//! - Three compile-time-selectable scheduler policies
//! - Tick-driven (`SysTick`) and voluntary (`PendSV`) context switching
//! - A small, typed error model in place of the original's bare PASS/FAIL
//!
//! Synchronization primitives (mutexes, semaphores, queues) and priority
//! inheritance are out of scope — see DESIGN.md.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

// ============ Critical Section ============

#[cfg(target_arch = "arm")]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

// ============ Modules ============

pub mod log;
mod lang_items;

pub mod core;
pub mod port;

// ============ Re-exports ============

pub use core::config;
pub use core::config::*;
pub use core::critical;
pub use core::error;
pub use core::error::{OsError, OsResult};
pub use core::kernel;
pub use core::kernel::{
    os_kernel_init, os_set_background_task, os_task_create, os_task_remove, os_task_suspend,
    os_yield, TaskConfig, TaskHandle,
};
pub use core::pool;
pub use core::sched;
pub use core::tcb;
pub use core::types;
pub use core::types::*;

#[cfg(feature = "pac")]
pub use stm32_metapac as pac;
