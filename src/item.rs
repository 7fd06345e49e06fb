use std::fmt::{Display, Formatter, Result};
use std::ops::Range;

use rand::Rng;

/* ---------- */

/// Range of the values [`Item::random`] draws from.
pub const ITEM_RANGE: Range<u32> = 0..100;

/// A unit of work handed from a producer to a consumer.
///
/// Items have no identity beyond their value: two items holding the same value
/// are indistinguishable. An item is owned by whoever currently holds it, the
/// producer before it's enqueued, the buffer while it's resident and the consumer
/// once dequeued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item(u32);

impl Item {
    /// Returns a new item holding `value`.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns an item whose value is drawn from [`ITEM_RANGE`].
    #[inline]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(ITEM_RANGE))
    }

    /// Returns the item's value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl Display for Item {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.0)
    }
}

/* ---------- */
