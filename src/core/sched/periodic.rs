//! Periodic policy: each thread runs every `period` ticks. `on_tick`
//! increments and wraps the tick counter, marks every `Inactive` thread
//! whose period divides the new tick count as `Pending`, then dispatches
//! to the first `Pending` thread found walking the ring from the
//! successor of `current` — the ring order here is the plain creation
//! order (no priority sort, see the preemptive policy for that). If one
//! full revolution finds nothing `Pending`, dispatch falls back to the
//! last TCB in the ring — conventionally the background/idle task,
//! whose period (1001) never divides the wrapping tick counter — per
//! spec.md §4.3.

use crate::core::pool::Pool;
use crate::types::{TaskState, TcbIndex};

pub fn close_ring(pool: &mut Pool) {
    pool.close_ring();
}

pub fn on_tick(pool: &mut Pool) -> Option<TcbIndex> {
    pool.tick_increment();
    pool.mark_pending_for_tick();
    dispatch(pool)
}

pub fn on_yield(pool: &mut Pool) -> Option<TcbIndex> {
    dispatch(pool)
}

fn dispatch(pool: &mut Pool) -> Option<TcbIndex> {
    let cur = pool.current()?;
    let start = pool.next_of(cur).unwrap_or(cur);
    let next = pool
        .first_pending_from(start)
        .or_else(|| pool.last())
        .unwrap_or(cur);
    // PENDING -> INACTIVE: on dispatch (spec.md §4.3).
    pool.set_state(next, TaskState::Inactive);
    pool.set_current(Some(next));
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    static mut STACK_A: [crate::types::OsStkElement; 16] = [0; 16];
    static mut STACK_B: [crate::types::OsStkElement; 16] = [0; 16];
    static mut STACK_IDLE: [crate::types::OsStkElement; 16] = [0; 16];

    #[test]
    fn falls_back_to_idle_when_nothing_is_pending() {
        // spec.md end-to-end scenario 2: at ticks 1 and 5 neither A
        // (period 2) nor B (period 3) is due, so idle must fill in.
        let mut pool = Pool::new();
        let a = pool.claim_slot().unwrap();
        pool.populate(a, unsafe { &mut STACK_A }, core::ptr::null_mut(), 2, 0);
        let b = pool.claim_slot().unwrap();
        pool.populate(b, unsafe { &mut STACK_B }, core::ptr::null_mut(), 3, 0);
        let idle = pool.claim_slot().unwrap();
        pool.populate(idle, unsafe { &mut STACK_IDLE }, core::ptr::null_mut(), 1001, 0);
        close_ring(&mut pool);

        assert_eq!(on_tick(&mut pool), Some(idle)); // tick 1
        assert_eq!(on_tick(&mut pool), Some(a)); // tick 2
        assert_eq!(on_tick(&mut pool), Some(b)); // tick 3
        assert_eq!(on_tick(&mut pool), Some(a)); // tick 4
        assert_eq!(on_tick(&mut pool), Some(idle)); // tick 5
    }
}
