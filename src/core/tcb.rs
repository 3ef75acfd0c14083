//! Task Control Block
//!
//! One per thread: the saved stack pointer, the stack region it points
//! into, and the bookkeeping the scheduler needs (period, state, priority,
//! ring link). Seeding the stack with a synthetic exception frame is
//! delegated to the per-architecture port module — this module only
//! knows the frame's *existence*, not its layout.

use crate::types::{OsPrio, OsStkElement, OsTick, TaskState, TcbIndex};

/// Task Control Block.
pub struct Tcb {
    /// Saved stack pointer. While the thread is not current, this points
    /// at the 17-word frame (the spec's 16-word hardware/callee-saved
    /// layout plus one `LR`/`EXC_RETURN` slot) that `port::cortex_m3`
    /// seeds and the context-switch handlers pop.
    pub(crate) stack_pointer: *mut OsStkElement,

    /// The backing memory for this thread's stack. `None` in an empty
    /// pool slot. Exclusive ownership: once a `&'static mut` buffer is
    /// handed to `create`, the kernel is its sole owner until `remove`.
    pub(crate) stack_region: Option<&'static mut [OsStkElement]>,

    /// Ticks between scheduled activations (periodic/preemptive). `1`
    /// means "every tick". Unused (but still set) under round-robin.
    pub(crate) period: OsTick,

    /// Current lifecycle state.
    pub(crate) state: TaskState,

    /// Scheduling priority (preemptive policy only). Higher = more urgent.
    pub(crate) priority: OsPrio,

    /// Next TCB in the ready ring.
    pub(crate) next: Option<TcbIndex>,

    /// Whether this pool slot is in use.
    pub(crate) live: bool,
}

impl Tcb {
    /// An empty, unallocated pool slot.
    pub const fn empty() -> Self {
        Tcb {
            stack_pointer: core::ptr::null_mut(),
            stack_region: None,
            period: 0,
            state: TaskState::Inactive,
            priority: 0,
            next: None,
            live: false,
        }
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    #[inline]
    pub fn priority(&self) -> OsPrio {
        self.priority
    }

    #[inline]
    pub fn period(&self) -> OsTick {
        self.period
    }
}
