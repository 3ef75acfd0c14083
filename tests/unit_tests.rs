//! Integration tests against the public API, run on the host via the
//! `#[cfg(not(target_arch = "arm"))]` stub port.

#[cfg(test)]
mod types_tests {
    use krtos::TaskState;

    #[test]
    fn task_state_equality() {
        assert_eq!(TaskState::Inactive, TaskState::Inactive);
        assert_ne!(TaskState::Inactive, TaskState::Pending);
        assert_ne!(TaskState::Pending, TaskState::Suspended);
    }
}

#[cfg(test)]
mod error_tests {
    use krtos::OsError;

    #[test]
    fn error_variants_are_distinct_and_debuggable() {
        assert_eq!(OsError::PoolFull, OsError::PoolFull);
        assert_ne!(OsError::PoolFull, OsError::StackTooSmall);
        let msg = format!("{:?}", OsError::SuspendCurrent);
        assert!(msg.contains("SuspendCurrent"));
    }
}

#[cfg(test)]
mod config_tests {
    use krtos::config::*;

    #[test]
    fn config_values_are_sane() {
        assert!(MAX_TASKS >= NUM_THREADS + 1, "need room for the idle task");
        assert!(MIN_STACK_WORDS >= 17, "a seeded frame needs 17 words");
        assert_eq!(SYSTEM_CLK, 8_000_000);
        assert_eq!(IDLE_PRIO, 0);
        assert!(IDLE_PERIOD > TICK_WRAP, "idle must never be tick-marked pending");
    }
}

#[cfg(test)]
mod facade_tests {
    use krtos::{os_task_create, os_task_remove, os_task_suspend, os_yield, OsError, TaskConfig};

    static mut STACK_ONE: [krtos::OsStkElement; 32] = [0; 32];
    static mut STACK_TWO: [krtos::OsStkElement; 32] = [0; 32];
    static mut TINY_STACK: [krtos::OsStkElement; 4] = [0; 4];

    extern "C" fn noop_task() -> ! {
        loop {}
    }

    // The kernel facade is backed by one process-wide static pool, so this
    // exercises the whole lifecycle in a single test rather than several
    // that could race each other under the test harness's default
    // parallelism.
    #[test]
    fn facade_lifecycle() {
        let err = os_task_create(TaskConfig {
            entry: noop_task,
            #[allow(static_mut_refs)]
            stack: unsafe { &mut TINY_STACK },
            period: 1,
            priority: 1,
        })
        .unwrap_err();
        assert_eq!(err, OsError::StackTooSmall);

        assert_eq!(os_yield().unwrap_err(), OsError::NotRunning);

        let a = os_task_create(TaskConfig {
            entry: noop_task,
            #[allow(static_mut_refs)]
            stack: unsafe { &mut STACK_ONE },
            period: 1,
            priority: 1,
        })
        .expect("first task should be created");

        let b = os_task_create(TaskConfig {
            entry: noop_task,
            #[allow(static_mut_refs)]
            stack: unsafe { &mut STACK_TWO },
            period: 1,
            priority: 1,
        })
        .expect("second task should be created");

        assert_ne!(a, b);

        // `a` is not the running thread before the kernel has bootstrapped
        // anything, so suspending it should succeed.
        os_task_suspend(a).expect("suspending a non-current task should succeed");

        os_task_remove(a).expect("first removal should succeed");
        assert_eq!(os_task_remove(a).unwrap_err(), OsError::TaskNotFound);

        os_task_remove(b).expect("second removal should succeed");
    }
}
