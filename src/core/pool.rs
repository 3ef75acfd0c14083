//! TCB pool and ready-list ring
//!
//! The pool owns every TCB in a fixed-size array; the ready-list is a
//! circular singly-linked list threaded through each TCB's `next` field,
//! expressed as indices into that same array (see spec.md §9 and
//! SPEC_FULL.md §3 for why indices rather than raw pointers).
//!
//! `create` appends in O(1) by tracking the last-appended slot directly
//! (spec.md §4.2); `remove` is O(n), walking from `current` until it finds
//! the predecessor of the target, exactly as spec.md describes.

use crate::config::MAX_TASKS;
use crate::error::{OsError, OsResult};
use crate::tcb::Tcb;
use crate::types::{OsPrio, OsStkElement, OsTick, TaskState, TcbIndex};

/// Fixed-size TCB storage plus the ring links and current-thread pointer.
///
/// Not public API — accessed only through the kernel facade, which is the
/// only code that ever calls these methods, always from inside a critical
/// section.
pub struct Pool {
    tcbs: [Tcb; MAX_TASKS],
    len: usize,
    head: Option<TcbIndex>,
    last: Option<TcbIndex>,
    current: Option<TcbIndex>,
    closed: bool,
    tick_counter: OsTick,
}

impl Pool {
    pub const fn new() -> Self {
        // `Tcb::empty()` is a `const fn`, but array-repeat-expr needs `Copy`
        // which `Tcb` deliberately isn't (it owns a `&'static mut` slice),
        // so the array is built element by element.
        Pool {
            tcbs: [
                Tcb::empty(), Tcb::empty(), Tcb::empty(), Tcb::empty(), Tcb::empty(),
                Tcb::empty(), Tcb::empty(), Tcb::empty(), Tcb::empty(), Tcb::empty(),
            ],
            len: 0,
            head: None,
            last: None,
            current: None,
            closed: false,
            tick_counter: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn tick_counter(&self) -> OsTick {
        self.tick_counter
    }

    /// Advance the tick counter, wrapping at `TICK_WRAP` (spec invariant 4).
    pub(crate) fn tick_increment(&mut self) -> OsTick {
        self.tick_counter += 1;
        if self.tick_counter >= crate::config::TICK_WRAP {
            self.tick_counter = 0;
        }
        self.tick_counter
    }

    #[inline]
    pub fn current(&self) -> Option<TcbIndex> {
        self.current
    }

    pub(crate) fn set_current(&mut self, idx: Option<TcbIndex>) {
        self.current = idx;
    }

    /// The last TCB in the ring's visiting order — conventionally the
    /// background/idle task, since `os_kernel_init` appends it after every
    /// user `create` and the ring-closing order (plain creation order for
    /// round-robin/periodic, descending-priority order for preemptive)
    /// always places it last. The periodic/preemptive dispatchers fall
    /// back to this slot when one full revolution finds nothing PENDING
    /// (spec.md §4.3).
    #[inline]
    pub(crate) fn last(&self) -> Option<TcbIndex> {
        self.last
    }

    fn slot(&self, idx: TcbIndex) -> &Tcb {
        &self.tcbs[idx.get()]
    }

    fn slot_mut(&mut self, idx: TcbIndex) -> &mut Tcb {
        &mut self.tcbs[idx.get()]
    }

    pub fn is_live(&self, idx: TcbIndex) -> bool {
        self.tcbs[idx.get()].live
    }

    pub fn state_of(&self, idx: TcbIndex) -> TaskState {
        self.slot(idx).state()
    }

    pub fn priority_of(&self, idx: TcbIndex) -> OsPrio {
        self.slot(idx).priority()
    }

    pub fn period_of(&self, idx: TcbIndex) -> OsTick {
        self.slot(idx).period()
    }

    pub(crate) fn set_state(&mut self, idx: TcbIndex, state: TaskState) {
        self.slot_mut(idx).state = state;
    }

    pub(crate) fn stack_pointer(&self, idx: TcbIndex) -> *mut OsStkElement {
        self.slot(idx).stack_pointer
    }

    pub(crate) fn set_stack_pointer(&mut self, idx: TcbIndex, sp: *mut OsStkElement) {
        self.slot_mut(idx).stack_pointer = sp;
    }

    pub(crate) fn next_of(&self, idx: TcbIndex) -> Option<TcbIndex> {
        self.slot(idx).next
    }

    /// Claim the first free slot. Does not link it into any ring.
    pub(crate) fn claim_slot(&mut self) -> OsResult<TcbIndex> {
        if self.len >= MAX_TASKS {
            return Err(OsError::PoolFull);
        }
        for i in 0..MAX_TASKS {
            if !self.tcbs[i].live {
                return Ok(TcbIndex::new(i));
            }
        }
        Err(OsError::PoolFull)
    }

    /// Populate a claimed slot and append it to the (still-open) creation
    /// chain. The chain is closed into a ring by `close_ring`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn populate(
        &mut self,
        idx: TcbIndex,
        stack_region: &'static mut [OsStkElement],
        stack_pointer: *mut OsStkElement,
        period: OsTick,
        priority: OsPrio,
    ) {
        {
            let tcb = self.slot_mut(idx);
            tcb.stack_region = Some(stack_region);
            tcb.stack_pointer = stack_pointer;
            tcb.period = period;
            tcb.priority = priority;
            tcb.state = TaskState::Inactive;
            tcb.next = None;
            tcb.live = true;
        }

        match self.last {
            Some(last) => self.slot_mut(last).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.last = Some(idx);
        self.len += 1;
    }

    /// Close the creation chain into a ring in the given visiting order.
    /// `order` lists every live index exactly once; `order[0]` becomes the
    /// new head and `current`.
    pub(crate) fn close_ring_in_order(&mut self, order: &[TcbIndex]) {
        debug_assert_eq!(order.len(), self.len);
        for w in order.windows(2) {
            self.slot_mut(w[0]).next = Some(w[1]);
        }
        if let Some(&last) = order.last() {
            if let Some(&first) = order.first() {
                self.slot_mut(last).next = Some(first);
                self.head = Some(first);
                self.last = Some(last);
                self.current = Some(first);
            }
        }
        self.closed = true;
    }

    /// Close the ring in plain creation order (round-robin/periodic).
    pub(crate) fn close_ring(&mut self) {
        let mut order = [TcbIndex::new(0); MAX_TASKS];
        let mut n = 0;
        let mut cur = self.head;
        while let Some(idx) = cur {
            order[n] = idx;
            n += 1;
            cur = self.slot(idx).next;
        }
        self.close_ring_in_order(&order[..n]);
    }

    /// Collect the current open (or closed) chain, in visiting order,
    /// stable-sorted by descending priority. Used by the preemptive
    /// policy's `init` step (spec.md §4.3: "pre-sorts the TCB array in
    /// descending priority"); here it sorts the *ring order*, not the
    /// physical array, so handles issued by earlier `create` calls stay
    /// valid (see SPEC_FULL.md's grounding notes in DESIGN.md).
    pub(crate) fn chain_sorted_by_priority_desc(&self) -> ([TcbIndex; MAX_TASKS], usize) {
        let mut order = [TcbIndex::new(0); MAX_TASKS];
        let mut n = 0;
        let mut cur = self.head;
        while let Some(idx) = cur {
            order[n] = idx;
            n += 1;
            cur = self.slot(idx).next;
        }
        // Stable insertion sort: MAX_TASKS is small (10), and stability is
        // what gives us "tie-break by [creation/ring] order" for free.
        for i in 1..n {
            let key = order[i];
            let key_prio = self.priority_of(key);
            let mut j = i;
            while j > 0 && self.priority_of(order[j - 1]) < key_prio {
                order[j] = order[j - 1];
                j -= 1;
            }
            order[j] = key;
        }
        (order, n)
    }

    /// Walk the ring starting at `start`, at most `self.len` steps,
    /// looking for the first live TCB in `Pending` state.
    pub(crate) fn first_pending_from(&self, start: TcbIndex) -> Option<TcbIndex> {
        let mut cur = start;
        for _ in 0..self.len {
            if self.slot(cur).state == TaskState::Pending {
                return Some(cur);
            }
            cur = self.slot(cur).next.unwrap_or(start);
        }
        None
    }

    /// Walk the full ring once looking for the highest-priority live TCB
    /// in `Pending` state, tie-broken by ring order (first one found wins
    /// ties because the comparison is strict `>`).
    pub(crate) fn highest_priority_pending_from(&self, start: TcbIndex) -> Option<TcbIndex> {
        let mut cur = start;
        let mut best: Option<TcbIndex> = None;
        for _ in 0..self.len {
            if self.slot(cur).state == TaskState::Pending {
                let better = match best {
                    None => true,
                    Some(b) => self.priority_of(cur) > self.priority_of(b),
                };
                if better {
                    best = Some(cur);
                }
            }
            cur = self.slot(cur).next.unwrap_or(start);
        }
        best
    }

    /// Mark every `Inactive` TCB whose period divides `tick_counter` as
    /// `Pending` (spec.md §4.3). Leaves `Pending`/`Suspended` TCBs alone —
    /// the state machine has no tick-driven transition out of either.
    pub(crate) fn mark_pending_for_tick(&mut self) {
        let tick = self.tick_counter;
        for i in 0..MAX_TASKS {
            let tcb = &mut self.tcbs[i];
            if tcb.live && tcb.state == TaskState::Inactive {
                let period = if tcb.period == 0 { 1 } else { tcb.period };
                if tick % period == 0 {
                    tcb.state = TaskState::Pending;
                }
            }
        }
    }

    /// Remove `idx` from the ring and free its slot. If `idx` is current,
    /// `current` is advanced to its successor first, per spec.md §4.2/§3.
    ///
    /// `current` is `None` before the kernel has bootstrapped its first
    /// thread (spec.md's ring-traversal requirement only asks that `idx`
    /// be reachable from the ring, not specifically from `current`), so
    /// the walk below starts from `current` when set and falls back to
    /// `head` otherwise.
    pub fn remove(&mut self, idx: TcbIndex) -> OsResult<()> {
        if !self.tcbs[idx.get()].live {
            return Err(OsError::TaskNotFound);
        }

        let Some(start) = self.current.or(self.head) else {
            return Err(OsError::TaskNotFound);
        };

        if self.current == Some(idx) {
            self.current = self.slot(idx).next;
        }

        // Single-element ring: nothing to splice, just free the slot.
        if self.slot(idx).next == Some(idx) {
            self.head = None;
            self.last = None;
            self.current = None;
            self.free_slot(idx);
            return Ok(());
        }

        // Walk from `start` until we find the predecessor of `idx`.
        let mut prev = start;
        let mut steps = 0;
        while self.slot(prev).next != Some(idx) {
            prev = match self.slot(prev).next {
                Some(n) => n,
                None => return Err(OsError::TaskNotFound),
            };
            steps += 1;
            if steps > MAX_TASKS {
                return Err(OsError::TaskNotFound);
            }
        }

        let successor = self.slot(idx).next;
        self.slot_mut(prev).next = successor;

        if self.head == Some(idx) {
            self.head = successor;
        }
        if self.last == Some(idx) {
            self.last = Some(prev);
        }

        self.free_slot(idx);
        Ok(())
    }

    fn free_slot(&mut self, idx: TcbIndex) {
        let tcb = self.slot_mut(idx);
        tcb.live = false;
        tcb.stack_region = None;
        tcb.stack_pointer = core::ptr::null_mut();
        tcb.next = None;
        tcb.state = TaskState::Inactive;
        self.len -= 1;
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static mut STACK_A: [OsStkElement; 16] = [0; 16];
    static mut STACK_B: [OsStkElement; 16] = [0; 16];
    static mut STACK_C: [OsStkElement; 16] = [0; 16];

    fn create(pool: &mut Pool, stack: &'static mut [OsStkElement], period: OsTick, prio: OsPrio) -> TcbIndex {
        let idx = pool.claim_slot().unwrap();
        pool.populate(idx, stack, core::ptr::null_mut(), period, prio);
        idx
    }

    #[test]
    fn claim_slot_fills_pool_then_fails() {
        let mut pool = Pool::new();
        for _ in 0..MAX_TASKS {
            let idx = pool.claim_slot().unwrap();
            pool.populate(idx, &mut [], core::ptr::null_mut(), 1, 0);
        }
        assert_eq!(pool.claim_slot().unwrap_err(), OsError::PoolFull);
    }

    #[test]
    fn close_ring_in_creation_order_is_circular() {
        let mut pool = Pool::new();
        let a = create(&mut pool, unsafe { &mut STACK_A }, 1, 0);
        let b = create(&mut pool, unsafe { &mut STACK_B }, 1, 0);
        let c = create(&mut pool, unsafe { &mut STACK_C }, 1, 0);
        pool.close_ring();

        assert_eq!(pool.current(), Some(a));
        assert_eq!(pool.next_of(a), Some(b));
        assert_eq!(pool.next_of(b), Some(c));
        assert_eq!(pool.next_of(c), Some(a));
    }

    #[test]
    fn remove_current_advances_and_frees_slot() {
        let mut pool = Pool::new();
        let a = create(&mut pool, unsafe { &mut STACK_A }, 1, 0);
        let b = create(&mut pool, unsafe { &mut STACK_B }, 1, 0);
        pool.close_ring();

        assert_eq!(pool.len(), 2);
        pool.remove(a).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.current(), Some(b));
        assert_eq!(pool.next_of(b), Some(b));
    }

    #[test]
    fn remove_unknown_index_fails() {
        let mut pool = Pool::new();
        let a = create(&mut pool, unsafe { &mut STACK_A }, 1, 0);
        pool.close_ring();
        pool.remove(a).unwrap();
        assert_eq!(pool.remove(a).unwrap_err(), OsError::TaskNotFound);
    }

    #[test]
    fn remove_before_ring_has_a_current_walks_from_head() {
        // `create` links the open chain but doesn't set `current` until
        // `close_ring`/`close_ring_in_order` runs at kernel init, so a
        // live, non-current task must still be removable beforehand.
        let mut pool = Pool::new();
        let a = create(&mut pool, unsafe { &mut STACK_A }, 1, 0);
        let b = create(&mut pool, unsafe { &mut STACK_B }, 1, 0);
        let c = create(&mut pool, unsafe { &mut STACK_C }, 1, 0);

        assert_eq!(pool.current(), None);
        pool.remove(b).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.next_of(a), Some(c));
    }

    #[test]
    fn tick_counter_wraps_at_tick_wrap() {
        let mut pool = Pool::new();
        pool.tick_counter = crate::config::TICK_WRAP - 1;
        assert_eq!(pool.tick_increment(), 0);
    }

    #[test]
    fn mark_pending_for_tick_only_affects_inactive() {
        let mut pool = Pool::new();
        let a = create(&mut pool, unsafe { &mut STACK_A }, 2, 0);
        let b = create(&mut pool, unsafe { &mut STACK_B }, 3, 0);
        pool.close_ring();
        pool.set_state(b, TaskState::Suspended);

        pool.tick_increment(); // tick = 1
        pool.mark_pending_for_tick();
        assert_eq!(pool.state_of(a), TaskState::Inactive);
        assert_eq!(pool.state_of(b), TaskState::Suspended);

        pool.tick_increment(); // tick = 2
        pool.mark_pending_for_tick();
        assert_eq!(pool.state_of(a), TaskState::Pending);
        assert_eq!(pool.state_of(b), TaskState::Suspended); // unaffected by tick
    }

    #[test]
    fn highest_priority_pending_tie_breaks_by_ring_order() {
        let mut pool = Pool::new();
        let a = create(&mut pool, unsafe { &mut STACK_A }, 1, 5);
        let b = create(&mut pool, unsafe { &mut STACK_B }, 1, 9);
        let c = create(&mut pool, unsafe { &mut STACK_C }, 1, 9);
        pool.close_ring();

        pool.set_state(a, TaskState::Pending);
        pool.set_state(b, TaskState::Pending);
        pool.set_state(c, TaskState::Pending);

        // b and c tie at priority 9; b comes first in ring order from a.
        assert_eq!(pool.highest_priority_pending_from(a), Some(b));
    }

    #[test]
    fn chain_sorted_by_priority_desc_is_stable() {
        let mut pool = Pool::new();
        let a = create(&mut pool, unsafe { &mut STACK_A }, 1, 1);
        let b = create(&mut pool, unsafe { &mut STACK_B }, 1, 9);
        let c = create(&mut pool, unsafe { &mut STACK_C }, 1, 9);

        let (order, n) = pool.chain_sorted_by_priority_desc();
        assert_eq!(&order[..n], &[b, c, a]);
    }
}
