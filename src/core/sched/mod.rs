//! Scheduler policy selection
//!
//! Exactly one of `sched-round-robin`, `sched-periodic`, `sched-preemptive`
//! is enabled (enforced by `core::config`'s `compile_error!`). Each policy
//! module exposes the same two entry points, called from the shared
//! context-switch handlers in `port::cortex_m3`:
//!
//! - `on_tick()` — once per `SysTick`, may update ready state and picks
//!   the next `current`.
//! - `on_yield()` — once per voluntary yield, picks the next `current`
//!   without touching tick-driven state.
//! - `close_ring()` — called once from `os_kernel_init`, after every task
//!   (including the idle task) has been created, to turn the open
//!   creation chain into a ring in the order this policy dispatches in.

#[cfg(feature = "sched-round-robin")]
mod round_robin;
#[cfg(feature = "sched-round-robin")]
pub use round_robin::{close_ring, on_tick, on_yield};

#[cfg(feature = "sched-periodic")]
mod periodic;
#[cfg(feature = "sched-periodic")]
pub use periodic::{close_ring, on_tick, on_yield};

#[cfg(feature = "sched-preemptive")]
mod preemptive;
#[cfg(feature = "sched-preemptive")]
pub use preemptive::{close_ring, on_tick, on_yield};
