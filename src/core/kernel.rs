//! Kernel facade and global state
//!
//! Owns the single `Pool` instance and the init/running flags, and exposes
//! the six entry points spec.md defines: `os_kernel_init`, `os_task_create`,
//! `os_yield`, `os_task_remove`, `os_task_suspend`, `os_set_background_task`.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::{IDLE_PERIOD, IDLE_PRIO, MIN_STACK_WORDS};
use crate::critical::{critical_section, is_isr_context};
use crate::core::cs_cell::CsCell;
use crate::error::{OsError, OsResult};
use crate::pool::Pool;
use crate::sched;
use crate::types::{OsPrio, OsStkElement, OsTick, TaskFn, TcbIndex};

/// Kernel init/running flags. Split from `Pool` so a `critical_section`
/// scope around the pool doesn't also need to reason about these.
struct KernelFlags {
    initialized: AtomicBool,
    running: AtomicBool,
}

impl KernelFlags {
    const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            running: AtomicBool::new(false),
        }
    }

    #[inline(always)]
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    #[inline(always)]
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

static KERNEL: KernelFlags = KernelFlags::new();

/// The one TCB pool/ready-ring for this kernel instance.
pub(crate) static POOL: CsCell<Pool> = CsCell::new(Pool::new());

/// Idle task stack, sized to the minimum seeded-frame footprint — the idle
/// body never calls into anything that needs more.
static mut IDLE_STACK: [OsStkElement; MIN_STACK_WORDS] = [0; MIN_STACK_WORDS];

/// Optional user callback run from inside the idle task's loop.
static BACKGROUND_TASK: CsCell<Option<TaskFn>> = CsCell::new(None);

/// Handle to a live task, returned by `os_task_create` and consumed by
/// `os_task_remove`/`os_task_suspend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle(pub(crate) TcbIndex);

/// Parameters for a new task, handed to `os_task_create`.
pub struct TaskConfig {
    /// Entry point. Must never return.
    pub entry: TaskFn,
    /// Caller-owned stack storage; the kernel becomes its sole owner until
    /// the task is removed.
    pub stack: &'static mut [OsStkElement],
    /// Ticks between activations under the periodic/preemptive policies.
    /// Ignored (but still stored) under round-robin.
    pub period: OsTick,
    /// Scheduling priority under the preemptive policy. Ignored elsewhere.
    pub priority: OsPrio,
}

extern "C" fn idle_task() -> ! {
    loop {
        let cb = critical_section(|cs| *BACKGROUND_TASK.get(cs));
        match cb {
            Some(f) => {
                f();
            }
            None => cortex_m_wfi(),
        }
    }
}

#[cfg(target_arch = "arm")]
#[inline(always)]
fn cortex_m_wfi() {
    cortex_m::asm::wfi();
}

#[cfg(not(target_arch = "arm"))]
#[inline(always)]
fn cortex_m_wfi() {}

/// Initialize the kernel: installs the idle task, closes the ready ring
/// in the active policy's dispatch order, programs the time base, and
/// bootstraps into the first thread. Never returns on success.
///
/// `quantum_ms` is the tick period in milliseconds, converted to SysTick
/// reload cycles via `SYSTEM_CLK / MILLIS_PRESCALER`.
pub fn os_kernel_init(quantum_ms: u32) -> OsResult<()> {
    if KERNEL.is_initialized() || KERNEL.is_running() {
        return Err(OsError::AlreadyRunning);
    }

    critical_section(|cs| -> OsResult<()> {
        let pool = POOL.get(cs);

        let idle_idx = pool.claim_slot()?;
        #[allow(static_mut_refs)]
        let idle_stack: &'static mut [OsStkElement] = unsafe { &mut IDLE_STACK };
        let idle_sp = unsafe { crate::port::seed_stack(idle_stack, idle_task) };
        pool.populate(idle_idx, idle_stack, idle_sp, IDLE_PERIOD, IDLE_PRIO);

        sched::close_ring(pool);

        KERNEL.initialized.store(true, Ordering::Release);
        Ok(())
    })?;

    let reload = crate::config::SYSTEM_CLK / crate::config::MILLIS_PRESCALER * quantum_ms;
    crate::port::reload_timer(reload);

    let entry_sp = critical_section(|cs| {
        let pool = POOL.get(cs);
        pool.current().map(|idx| pool.stack_pointer(idx))
    });

    let Some(sp) = entry_sp else {
        return Err(OsError::PoolFull);
    };

    KERNEL.running.store(true, Ordering::Release);

    unsafe { crate::port::bootstrap(sp) }
}

/// Create a new task. Valid from either thread or interrupt context — the
/// critical section inside makes concurrent callers safe without having
/// to reject either one.
pub fn os_task_create(cfg: TaskConfig) -> OsResult<TaskHandle> {
    if cfg.stack.len() < MIN_STACK_WORDS {
        return Err(OsError::StackTooSmall);
    }

    critical_section(|cs| {
        let pool = POOL.get(cs);
        let idx = pool.claim_slot()?;
        let sp = unsafe { crate::port::seed_stack(cfg.stack, cfg.entry) };
        pool.populate(idx, cfg.stack, sp, cfg.period, cfg.priority);
        Ok(TaskHandle(idx))
    })
}

/// Voluntarily yield the CPU. Thread context only.
pub fn os_yield() -> OsResult<()> {
    if is_isr_context() {
        return Err(OsError::IsrContext);
    }
    if !KERNEL.is_running() {
        return Err(OsError::NotRunning);
    }
    crate::port::trigger_pendsv();
    Ok(())
}

/// Remove a task, freeing its pool slot. Thread context only. Removing
/// the currently running task triggers an immediate context switch.
pub fn os_task_remove(handle: TaskHandle) -> OsResult<()> {
    if is_isr_context() {
        return Err(OsError::IsrContext);
    }

    let was_current = critical_section(|cs| -> OsResult<bool> {
        let pool = POOL.get(cs);
        let was_current = pool.current() == Some(handle.0);
        pool.remove(handle.0)?;
        Ok(was_current)
    })?;

    if was_current && KERNEL.is_running() {
        crate::port::trigger_pendsv();
    }

    Ok(())
}

/// Suspend a task. Thread context only; suspending the currently running
/// task is rejected — the caller must `os_yield()` away from it first.
pub fn os_task_suspend(handle: TaskHandle) -> OsResult<()> {
    if is_isr_context() {
        return Err(OsError::IsrContext);
    }

    critical_section(|cs| {
        let pool = POOL.get(cs);
        if !pool.is_live(handle.0) {
            return Err(OsError::TaskNotFound);
        }
        if pool.current() == Some(handle.0) {
            return Err(OsError::SuspendCurrent);
        }
        pool.set_state(handle.0, crate::types::TaskState::Suspended);
        Ok(())
    })
}

/// Install (or clear, with `None`) the callback the idle task runs each
/// time it finds nothing else pending.
pub fn os_set_background_task(task: Option<TaskFn>) -> OsResult<()> {
    critical_section(|cs| {
        *BACKGROUND_TASK.get(cs) = task;
    });
    Ok(())
}

/// Called from the `SysTick` handler after it spills callee-saves and
/// reads the outgoing stack pointer into a register. Saves that pointer
/// into the outgoing TCB, runs the active policy's tick step, and returns
/// the incoming TCB's stack pointer for the handler to reload.
pub(crate) fn on_tick(current_sp: *mut OsStkElement) -> *mut OsStkElement {
    critical_section(|cs| {
        let pool = POOL.get(cs);
        if let Some(cur) = pool.current() {
            pool.set_stack_pointer(cur, current_sp);
        }
        let next = sched::on_tick(pool).unwrap_or_else(|| pool.current().expect("ring is empty"));
        pool.stack_pointer(next)
    })
}

/// Same as `on_tick`, called from the `PendSV` handler for a voluntary
/// yield (also reached when `os_task_remove` removes the current task).
pub(crate) fn on_yield(current_sp: *mut OsStkElement) -> *mut OsStkElement {
    critical_section(|cs| {
        let pool = POOL.get(cs);
        if let Some(cur) = pool.current() {
            pool.set_stack_pointer(cur, current_sp);
        }
        let next = sched::on_yield(pool).unwrap_or_else(|| pool.current().expect("ring is empty"));
        pool.stack_pointer(next)
    })
}

/// Current tick counter, for the `defmt` timestamp hook.
pub fn tick_get() -> OsTick {
    critical_section(|cs| POOL.get(cs).tick_counter())
}
