//! Error types for the kernel
//!
//! Spec error handling is coarse — PASS/FAIL — because the target has no
//! error-reporting channel above the firmware's own logging. The variants
//! below are the distinct *reasons* a FAIL can occur, kept to exactly the
//! failure modes spec.md §7 enumerates; there is no retry policy and no
//! transient error, because every error here is a programming error.

/// Kernel error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsError {
    /// `create` was handed a null/invalid task configuration.
    NullConfig,
    /// The TCB pool is full (`MAX_TASKS` already live).
    PoolFull,
    /// `stack_words < MIN_STACK_WORDS`.
    StackTooSmall,
    /// Priority out of range (preemptive policy only).
    PrioInvalid,
    /// `remove`/`suspend`/`resume` referenced a TCB not reachable from
    /// the ready ring.
    TaskNotFound,
    /// `suspend` was asked to suspend the currently-running thread; the
    /// caller must `os_yield()` first (see SPEC_FULL.md §9).
    SuspendCurrent,
    /// `os_kernel_init` called while already initialized/running.
    AlreadyRunning,
    /// An operation that requires a running kernel was called before
    /// `os_kernel_init`'s bootstrap.
    NotRunning,
    /// `create`/`remove`/`suspend`/`os_yield` called from interrupt
    /// context, where none of them are valid.
    IsrContext,
    /// `set_background_task` was handed a null callback.
    NullCallback,
}

/// Result type alias for kernel operations.
pub type OsResult<T> = Result<T, OsError>;
