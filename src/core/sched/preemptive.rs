//! Preemptive policy: like periodic (tick-driven `Pending` marking), but
//! dispatch picks the highest-priority `Pending` thread in the ring
//! rather than the first one encountered, tie-broken by ring order. If
//! one full revolution finds nothing `Pending`, dispatch falls back to
//! the last TCB in the ring — conventionally the background/idle task,
//! whose priority 0 sorts it last by `close_ring` and whose period
//! (1001) keeps it from ever being marked `Pending` on its own — per
//! spec.md §4.3.
//!
//! `close_ring` sorts the *ring order* by descending priority once, at
//! `os_kernel_init` time (spec.md §4.3's "pre-sorts the TCB array in
//! descending priority"); this crate sorts the ring's visiting order
//! rather than physically relocating TCBs, so `TaskHandle`s issued by
//! earlier `os_task_create` calls stay valid (see DESIGN.md).

use crate::core::pool::Pool;
use crate::types::{TaskState, TcbIndex};

pub fn close_ring(pool: &mut Pool) {
    let (order, n) = pool.chain_sorted_by_priority_desc();
    pool.close_ring_in_order(&order[..n]);
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
    let best = pool
        .highest_priority_pending_from(cur)
        .or_else(|| pool.last())
        .unwrap_or(cur);
    // PENDING -> INACTIVE: on dispatch (spec.md §4.3).
    pool.set_state(best, TaskState::Inactive);
    pool.set_current(Some(best));
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    static mut STACK_LOW: [crate::types::OsStkElement; 16] = [0; 16];
    static mut STACK_HIGH: [crate::types::OsStkElement; 16] = [0; 16];

    #[test]
    fn close_ring_orders_by_descending_priority() {
        let mut pool = Pool::new();
        let low = pool.claim_slot().unwrap();
        pool.populate(low, unsafe { &mut STACK_LOW }, core::ptr::null_mut(), 1, 1);
        let high = pool.claim_slot().unwrap();
        pool.populate(high, unsafe { &mut STACK_HIGH }, core::ptr::null_mut(), 1, 9);

        close_ring(&mut pool);

        // Ring order is priority-descending even though `low` was created
        // first, so handles issued before `close_ring` stay valid.
        assert_eq!(pool.current(), Some(high));
        assert_eq!(pool.next_of(high), Some(low));
        assert_eq!(pool.next_of(low), Some(high));
    }

    #[test]
    fn higher_priority_pending_preempts_lower() {
        let mut pool = Pool::new();
        let low = pool.claim_slot().unwrap();
        pool.populate(low, unsafe { &mut STACK_LOW }, core::ptr::null_mut(), 1, 1);
        let high = pool.claim_slot().unwrap();
        pool.populate(high, unsafe { &mut STACK_HIGH }, core::ptr::null_mut(), 1, 9);
        close_ring(&mut pool);

        pool.set_state(low, TaskState::Pending);
        pool.set_state(high, TaskState::Pending);

        assert_eq!(on_yield(&mut pool), Some(high));
    }

    #[test]
    fn dispatch_falls_back_to_idle_when_nothing_pending() {
        let mut pool = Pool::new();
        let idle = pool.claim_slot().unwrap();
        // Stands in for the background/idle task: lowest priority, so
        // `close_ring` sorts it last regardless of creation order.
        pool.populate(idle, unsafe { &mut STACK_LOW }, core::ptr::null_mut(), 1001, 0);
        let high = pool.claim_slot().unwrap();
        pool.populate(high, unsafe { &mut STACK_HIGH }, core::ptr::null_mut(), 1, 9);
        close_ring(&mut pool);

        // Nothing is Pending; the one full revolution finds no candidate.
        assert_eq!(on_yield(&mut pool), Some(idle));
    }
}
