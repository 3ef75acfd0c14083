//! Compile-time configuration
//!
//! These constants control the resource limits of the kernel and mirror
//! the `KRTOS_cfg.h` knobs of the original source: number of user
//! threads, per-thread stack size, and the selected scheduler policy.

#[cfg(not(any(
    feature = "sched-round-robin",
    feature = "sched-periodic",
    feature = "sched-preemptive"
)))]
compile_error!(
    "enable exactly one of: sched-round-robin, sched-periodic, sched-preemptive"
);

#[cfg(any(
    all(feature = "sched-round-robin", feature = "sched-periodic"),
    all(feature = "sched-round-robin", feature = "sched-preemptive"),
    all(feature = "sched-periodic", feature = "sched-preemptive"),
))]
compile_error!(
    "enable exactly one of: sched-round-robin, sched-periodic, sched-preemptive"
);

/// Number of user threads the application is expected to create.
/// The kernel always adds one more slot for the idle thread.
pub const NUM_THREADS: usize = 3;

/// Default per-thread stack size in words (400 bytes).
pub const STACK_SIZE: usize = 100;

/// Hard ceiling on live TCB slots (user threads + idle).
pub const MAX_TASKS: usize = 10;

/// Smallest stack a seeded frame fits in: 8 callee-saved registers, one
/// `LR`/`EXC_RETURN` slot the context-switch handlers restore across
/// their call into the scheduler, plus the 8 hardware-auto-stacked
/// registers (see `port::cortex_m3`).
pub const MIN_STACK_WORDS: usize = 17;

/// Default CPU clock, matching the STM32F103's internal 8 MHz HSI.
pub const SYSTEM_CLK: u32 = 8_000_000;

/// Ticks-to-milliseconds divisor used when programming the time base.
pub const MILLIS_PRESCALER: u32 = 1000;

/// Tick count at which the periodic/preemptive tick counter wraps.
pub const TICK_WRAP: u32 = 1000;

/// Period value meaning "every tick".
pub const PERIOD_EVERY_TICK: u32 = 1;

/// Idle task period: large enough that it is never itself marked PENDING
/// by the tick-driven policies, so it only ever runs as the dispatcher's
/// fallback.
pub const IDLE_PERIOD: u32 = 1001;

/// Idle task priority: lowest urgency under the preemptive policy.
pub const IDLE_PRIO: u8 = 0;
