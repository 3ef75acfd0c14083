//! Round-robin policy: every thread gets one ring slot, advance on every
//! tick and on every voluntary yield alike (spec.md testable scenario 3:
//! yield under round-robin is "move on one slot").

use crate::core::pool::Pool;
use crate::types::TcbIndex;

pub fn close_ring(pool: &mut Pool) {
    pool.close_ring();
}

pub fn on_tick(pool: &mut Pool) -> Option<TcbIndex> {
    advance(pool)
}

pub fn on_yield(pool: &mut Pool) -> Option<TcbIndex> {
    advance(pool)
}

fn advance(pool: &mut Pool) -> Option<TcbIndex> {
    let next = pool.current().and_then(|cur| pool.next_of(cur));
    pool.set_current(next);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    static mut STACK_A: [crate::types::OsStkElement; 16] = [0; 16];
    static mut STACK_B: [crate::types::OsStkElement; 16] = [0; 16];

    #[test]
    fn yield_and_tick_both_advance_one_slot() {
        let mut pool = Pool::new();
        let a = pool.claim_slot().unwrap();
        pool.populate(a, unsafe { &mut STACK_A }, core::ptr::null_mut(), 1, 0);
        let b = pool.claim_slot().unwrap();
        pool.populate(b, unsafe { &mut STACK_B }, core::ptr::null_mut(), 1, 0);
        close_ring(&mut pool);

        assert_eq!(pool.current(), Some(a));
        assert_eq!(on_yield(&mut pool), Some(b));
        assert_eq!(on_tick(&mut pool), Some(a));
    }
}
