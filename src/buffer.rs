use std::collections::VecDeque;
use std::fmt::{self, Formatter};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use std_semaphore::Semaphore;

use crate::counter::TerminationCounter;
use crate::item::Item;

/* ---------- */

/// Outcome of [`BoundedBuffer::try_enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// The item was stored, `produced` is the run's production total including it.
    Stored {
        /// Number of items produced so far.
        produced: usize,
    },
    /// The target was already reached, the item is handed back untouched.
    Rejected(Item),
}

/// Outcome of [`BoundedBuffer::try_dequeue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dequeued {
    /// The oldest item of the buffer was taken, `consumed` is the run's consumption total including it.
    Taken {
        /// The item removed from the head of the buffer.
        item: Item,
        /// Number of items consumed so far.
        consumed: usize,
    },
    /// Every item of the run has been consumed, nothing will ever be taken again.
    Drained,
}

/// A consistent view of the buffer, taken under its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Number of items currently resident.
    pub len: usize,
    /// Capacity of the buffer.
    pub capacity: usize,
    /// Number of items produced so far.
    pub produced: usize,
    /// Number of items consumed so far.
    pub consumed: usize,
    /// Number of items the run must go through.
    pub target: usize,
}

impl Snapshot {
    /// Returns `true` if `0 <= len <= capacity` and `consumed <= produced <= target`.
    #[inline]
    pub fn holds_invariants(&self) -> bool {
        self.len <= self.capacity && self.consumed <= self.produced && self.produced <= self.target
    }
}

/* ---------- */

/// A fixed-capacity FIFO shared by any number of producers and consumers.
///
/// The queue and the [`TerminationCounter`] sit behind a single lock, so every decision to store,
/// take or stop is made against a consistent view of both. Two counting signals do the blocking:
/// `empty_slots` starts at the capacity and `full_slots` starts at zero.
///
/// Workers that find the run over give back the permit they acquired, so that a sibling blocked on
/// the same signal wakes up and reaches the same conclusion. The consumer that takes the very last
/// item also releases one extra `full_slots` permit to start that chain among the consumers.
///
/// The buffer never logs anything itself, callers get a hook that runs under the lock instead.
///
/// # Examples
///
/// ```
/// # use std::num::NonZeroUsize;
/// # use workshop::{BoundedBuffer, Dequeued, Enqueued, Item};
/// let capacity = NonZeroUsize::new(2).unwrap();
/// let target = NonZeroUsize::new(1).unwrap();
/// let buffer = BoundedBuffer::new(capacity, target);
///
/// assert_eq!(buffer.try_enqueue(Item::new(7), |_, _| ()), Enqueued::Stored { produced: 1 });
/// assert_eq!(buffer.try_enqueue(Item::new(8), |_, _| ()), Enqueued::Rejected(Item::new(8)));
///
/// assert_eq!(
///     buffer.try_dequeue(|_, _| ()),
///     Dequeued::Taken { item: Item::new(7), consumed: 1 }
/// );
/// assert_eq!(buffer.try_dequeue(|_, _| ()), Dequeued::Drained);
/// ```
pub struct BoundedBuffer {
    state: Mutex<State>,
    empty_slots: Semaphore,
    full_slots: Semaphore,
    capacity: usize,
}

#[derive(Debug)]
struct State {
    queue: VecDeque<Item>,
    counter: TerminationCounter,
    closed: bool,
}

impl State {
    #[inline]
    fn take(&mut self) -> Option<(Item, usize)> {
        // A queued item was counted as produced but not consumed yet,
        // so recording its consumption can't fail.
        let item = self.queue.pop_front()?;
        let consumed = self.counter.record_consumed()?;

        Some((item, consumed))
    }
}

impl BoundedBuffer {
    /// Returns an empty buffer holding at most `capacity` items, for a run of `target` items.
    pub fn new(capacity: NonZeroUsize, target: NonZeroUsize) -> Self {
        Self {
            state: Mutex::new(State {
                queue: VecDeque::with_capacity(capacity.get()),
                counter: TerminationCounter::new(target.get()),
                closed: false,
            }),
            empty_slots: Semaphore::new(permits(capacity.get())),
            full_slots: Semaphore::new(0),
            capacity: capacity.get(),
        }
    }

    /// Offers `item` to the buffer, blocking until a slot is free.
    ///
    /// Once a slot is reserved, the production counter is checked under the lock. If the target
    /// was already reached, the slot is given back and the item returned in [`Enqueued::Rejected`].
    /// Otherwise, the item is appended, counted, `on_stored` is called with the item and the new
    /// production total while the lock is still held, and a consumer is signaled.
    pub fn try_enqueue<F>(&self, item: Item, on_stored: F) -> Enqueued
    where
        F: FnOnce(Item, usize),
    {
        self.empty_slots.acquire();

        let mut state = self.lock();
        let produced = (!state.closed)
            .then(|| state.counter.record_produced())
            .flatten();

        let Some(produced) = produced else {
            drop(state);
            self.empty_slots.release();
            return Enqueued::Rejected(item);
        };

        debug_assert!(state.queue.len() < self.capacity);
        state.queue.push_back(item);
        on_stored(item, produced);
        drop(state);

        self.full_slots.release();
        Enqueued::Stored { produced }
    }

    /// Takes the oldest item of the buffer, blocking until one is available.
    ///
    /// Once an item is reserved, the consumption counter is checked under the lock. If every item
    /// of the run was already consumed, the reservation is given back and [`Dequeued::Drained`]
    /// returned. Otherwise, the head item is removed, counted, `on_taken` is called with the item
    /// and the new consumption total while the lock is still held, and a producer is signaled.
    pub fn try_dequeue<F>(&self, on_taken: F) -> Dequeued
    where
        F: FnOnce(Item, usize),
    {
        self.full_slots.acquire();

        let mut state = self.lock();
        if state.closed || state.counter.consumption_complete() {
            drop(state);
            self.full_slots.release();
            return Dequeued::Drained;
        }

        let Some((item, consumed)) = state.take() else {
            unreachable!("a full slot was acquired while the buffer was empty");
        };

        on_taken(item, consumed);
        let drained = state.counter.consumption_complete();
        drop(state);

        self.empty_slots.release();
        if drained {
            // Nothing will be produced anymore, get the consumers still waiting moving.
            self.full_slots.release();
        }

        Dequeued::Taken { item, consumed }
    }

    /// Returns `true` once the target was both produced and consumed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.lock().counter.is_complete()
    }

    /// Returns a consistent view of the buffer and its counters.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock();

        Snapshot {
            len: state.queue.len(),
            capacity: self.capacity,
            produced: state.counter.produced(),
            consumed: state.counter.consumed(),
            target: state.counter.target(),
        }
    }

    /// Ends the run early: every blocked and future call returns
    /// [`Enqueued::Rejected`] or [`Dequeued::Drained`].
    ///
    /// A single permit is released on each signal: whoever takes it sees the buffer closed and
    /// hands it on, until every blocked worker left. Only used when the run can't be set up entirely.
    pub fn close(&self) {
        self.lock().closed = true;
        self.empty_slots.release();
        self.full_slots.release();
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, State> {
        // Queue and counter are only updated once nothing can panic anymore.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for BoundedBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.lock();

        f.debug_struct("BoundedBuffer")
            .field("queue", &state.queue)
            .field("counter", &state.counter)
            .field("closed", &state.closed)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[inline]
fn permits(capacity: usize) -> isize {
    // A buffer that large could never be allocated anyway.
    isize::try_from(capacity).unwrap_or(isize::MAX)
}

/* ---------- */

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::test_utils::{nz, within};

    #[test]
    fn fifo_order() {
        let buffer = BoundedBuffer::new(nz(3), nz(3));

        for value in [3, 1, 2] {
            buffer.try_enqueue(Item::new(value), |_, _| ());
        }

        let taken = (0..3)
            .map(|_| match buffer.try_dequeue(|_, _| ()) {
                Dequeued::Taken { item, .. } => item.value(),
                Dequeued::Drained => panic!("the buffer shouldn't be drained yet"),
            })
            .collect::<Vec<_>>();

        assert_eq!(taken, [3, 1, 2]);
    }

    #[test]
    fn rejects_past_target_and_gives_the_slot_back() {
        let buffer = BoundedBuffer::new(nz(4), nz(2));

        assert_eq!(
            buffer.try_enqueue(Item::new(1), |_, _| ()),
            Enqueued::Stored { produced: 1 }
        );
        assert_eq!(
            buffer.try_enqueue(Item::new(2), |_, _| ()),
            Enqueued::Stored { produced: 2 }
        );
        assert_eq!(
            buffer.try_enqueue(Item::new(3), |_, _| ()),
            Enqueued::Rejected(Item::new(3))
        );

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len, 2);
        assert_eq!(snapshot.produced, 2);

        // Two slots are left, keeping any of them would block the third attempt.
        let buffer = Arc::new(buffer);
        let rejected = within(Duration::from_secs(5), move || {
            (0..3)
                .map(|value| buffer.try_enqueue(Item::new(value), |_, _| ()))
                .collect::<Vec<_>>()
        });
        assert!(rejected
            .iter()
            .all(|res| matches!(res, Enqueued::Rejected(_))));
    }

    #[test]
    fn hooks_run_only_on_success() {
        let buffer = BoundedBuffer::new(nz(1), nz(1));
        let mut stored = Vec::new();
        let mut taken = Vec::new();

        buffer.try_enqueue(Item::new(5), |item, n| stored.push((item, n)));
        buffer.try_dequeue(|item, n| taken.push((item, n)));
        buffer.try_enqueue(Item::new(6), |item, n| stored.push((item, n)));
        buffer.try_dequeue(|item, n| taken.push((item, n)));

        assert_eq!(stored, [(Item::new(5), 1)]);
        assert_eq!(taken, [(Item::new(5), 1)]);
    }

    #[test]
    fn drained_once_target_consumed() {
        let buffer = BoundedBuffer::new(nz(1), nz(1));

        buffer.try_enqueue(Item::new(9), |_, _| ());
        assert_eq!(
            buffer.try_dequeue(|_, _| ()),
            Dequeued::Taken {
                item: Item::new(9),
                consumed: 1
            }
        );

        // Repeatedly, the permit keeps being handed on.
        for _ in 0..3 {
            assert_eq!(buffer.try_dequeue(|_, _| ()), Dequeued::Drained);
        }

        assert!(buffer.is_complete());
    }

    #[test]
    fn full_buffer_blocks_producers() {
        let buffer = Arc::new(BoundedBuffer::new(nz(1), nz(5)));
        buffer.try_enqueue(Item::new(1), |_, _| ());

        let producer = {
            let buffer = buffer.clone();
            std::thread::spawn(move || buffer.try_enqueue(Item::new(2), |_, _| ()))
        };

        std::thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished(), "the producer should wait for a slot");
        assert_eq!(buffer.snapshot().len, 1);

        buffer.try_dequeue(|_, _| ());
        let res = within(Duration::from_secs(5), move || producer.join().unwrap());
        assert_eq!(res, Enqueued::Stored { produced: 2 });
    }

    #[test]
    fn surplus_consumers_are_released() {
        let buffer = Arc::new(BoundedBuffer::new(nz(1), nz(1)));
        let consumers = (0..5)
            .map(|_| {
                let buffer = buffer.clone();
                std::thread::spawn(move || {
                    let mut taken = 0;
                    while let Dequeued::Taken { .. } = buffer.try_dequeue(|_, _| ()) {
                        taken += 1;
                    }
                    taken
                })
            })
            .collect::<Vec<_>>();

        std::thread::sleep(Duration::from_millis(20));
        buffer.try_enqueue(Item::new(4), |_, _| ());

        let total = within(Duration::from_secs(5), move || {
            consumers
                .into_iter()
                .map(|consumer| consumer.join().unwrap())
                .sum::<usize>()
        });
        assert_eq!(total, 1);
    }

    #[test]
    fn surplus_producers_are_released() {
        let buffer = Arc::new(BoundedBuffer::new(nz(1), nz(2)));
        let producers = (0..5)
            .map(|id| {
                let buffer = buffer.clone();
                std::thread::spawn(move || {
                    let mut stored = 0;
                    while let Enqueued::Stored { .. } = buffer.try_enqueue(Item::new(id), |_, _| ())
                    {
                        stored += 1;
                    }
                    stored
                })
            })
            .collect::<Vec<_>>();

        let (stored, taken) = within(Duration::from_secs(5), move || {
            let mut taken = 0;
            while let Dequeued::Taken { .. } = buffer.try_dequeue(|_, _| ()) {
                taken += 1;
            }

            let stored = producers
                .into_iter()
                .map(|producer| producer.join().unwrap())
                .sum::<usize>();
            (stored, taken)
        });

        assert_eq!(stored, 2);
        assert_eq!(taken, 2);
    }

    #[test]
    fn contention_keeps_invariants() {
        const PRODUCERS: u32 = 4;
        const CONSUMERS: usize = 4;
        const TARGET: usize = 2_000;

        let buffer = Arc::new(BoundedBuffer::new(nz(3), nz(TARGET)));
        let done = Arc::new(AtomicBool::new(false));

        let sampler = {
            let buffer = buffer.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    let snapshot = buffer.snapshot();
                    assert!(snapshot.holds_invariants(), "{snapshot:?}");
                }
            })
        };

        // Values are unique so that each item can be traced.
        let producers = (0..PRODUCERS)
            .map(|id| {
                let buffer = buffer.clone();
                std::thread::spawn(move || {
                    let mut stored = Vec::new();
                    for nth in 0.. {
                        let item = Item::new(id * 1_000_000 + nth);
                        match buffer.try_enqueue(item, |_, _| ()) {
                            Enqueued::Stored { .. } => stored.push(item),
                            Enqueued::Rejected(_) => break,
                        }
                    }
                    stored
                })
            })
            .collect::<Vec<_>>();

        let consumers = (0..CONSUMERS)
            .map(|_| {
                let buffer = buffer.clone();
                std::thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Dequeued::Taken { item, .. } = buffer.try_dequeue(|_, _| ()) {
                        taken.push(item);
                    }
                    taken
                })
            })
            .collect::<Vec<_>>();

        let (stored, taken) = within(Duration::from_secs(30), move || {
            let stored = producers
                .into_iter()
                .flat_map(|producer| producer.join().unwrap())
                .collect::<Vec<_>>();
            let taken = consumers
                .into_iter()
                .flat_map(|consumer| consumer.join().unwrap())
                .collect::<Vec<_>>();
            (stored, taken)
        });

        done.store(true, Ordering::Relaxed);
        sampler.join().expect("an invariant was broken");

        assert_eq!(stored.len(), TARGET);
        assert_eq!(taken.len(), TARGET);

        let stored = stored.into_iter().collect::<HashSet<_>>();
        let taken = taken.into_iter().collect::<HashSet<_>>();
        assert_eq!(taken.len(), TARGET, "an item was taken twice");
        assert_eq!(stored, taken);

        let snapshot = buffer.snapshot();
        assert_eq!((snapshot.produced, snapshot.consumed, snapshot.len), (TARGET, TARGET, 0));
    }

    #[test]
    fn close_wakes_everyone_up() {
        let buffer = Arc::new(BoundedBuffer::new(nz(1), nz(10)));
        let consumer = {
            let buffer = buffer.clone();
            std::thread::spawn(move || buffer.try_dequeue(|_, _| ()))
        };

        buffer.try_enqueue(Item::new(1), |_, _| ());
        // The consumer may or may not have taken that one yet.
        std::thread::sleep(Duration::from_millis(20));
        buffer.close();

        within(Duration::from_secs(5), move || consumer.join().unwrap());
        assert_eq!(
            buffer.try_enqueue(Item::new(2), |_, _| ()),
            Enqueued::Rejected(Item::new(2))
        );
        assert_eq!(buffer.try_dequeue(|_, _| ()), Dequeued::Drained);
    }

    #[test]
    fn close_releases_blocked_producers() {
        let buffer = Arc::new(BoundedBuffer::new(nz(1), nz(10)));
        buffer.try_enqueue(Item::new(0), |_, _| ());

        let producers = (1..4)
            .map(|value| {
                let buffer = buffer.clone();
                std::thread::spawn(move || buffer.try_enqueue(Item::new(value), |_, _| ()))
            })
            .collect::<Vec<_>>();

        std::thread::sleep(Duration::from_millis(50));
        assert!(producers.iter().all(|producer| !producer.is_finished()));
        buffer.close();

        let results = within(Duration::from_secs(5), move || {
            producers
                .into_iter()
                .map(|producer| producer.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert!(results
            .iter()
            .all(|res| matches!(res, Enqueued::Rejected(_))));
        assert_eq!(buffer.snapshot().produced, 1);
    }

    #[test]
    fn close_releases_blocked_consumers() {
        let buffer = Arc::new(BoundedBuffer::new(nz(2), nz(10)));

        let consumers = (0..3)
            .map(|_| {
                let buffer = buffer.clone();
                std::thread::spawn(move || buffer.try_dequeue(|_, _| ()))
            })
            .collect::<Vec<_>>();

        std::thread::sleep(Duration::from_millis(50));
        assert!(consumers.iter().all(|consumer| !consumer.is_finished()));
        buffer.close();

        let results = within(Duration::from_secs(5), move || {
            consumers
                .into_iter()
                .map(|consumer| consumer.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert_eq!(results, [Dequeued::Drained; 3]);
        assert_eq!(buffer.snapshot().consumed, 0);
    }
}
