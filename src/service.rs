use std::sync::Arc;

use crate::activity::ActivityLog;
use crate::buffer::BoundedBuffer;

/* ---------- */

/// A type that implements this trait hands an endpoint to the shared state it owns to any type
/// implementing [`Connect`] of it.
///
/// The shared [`BoundedBuffer`] and [`ActivityLog`] of a run register themselves, behind an [`Arc`],
/// into every worker context that needs them.
///
/// # Examples
///
/// ```
/// # use std::num::NonZeroUsize;
/// # use std::sync::Arc;
/// # use workshop::*;
/// let capacity = NonZeroUsize::new(2).unwrap();
/// let target = NonZeroUsize::new(1).unwrap();
/// let mut buffer = Arc::new(BoundedBuffer::new(capacity, target));
/// let mut log = Arc::new(ActivityLog::new());
///
/// let mut producer = ProducerContext::new(0);
/// buffer.register(&mut producer);
/// log.register(&mut producer);
///
/// let mut runtime = Runtime::new();
/// runtime.launch_from_context(producer).unwrap();
/// runtime.wait().unwrap();
///
/// assert_eq!(buffer.snapshot().produced, 1);
/// ```
pub trait Register {
    /// The type used to reach the registered state.
    type Endpoint;

    /// Connects the [`Register`] to the `other` entity with must implement [`Connect`] of `self`.
    ///
    /// This function should pass a `Endpoint` to `other` by calling the [`Connect::on_connection`] function.
    fn register(&mut self, other: &mut impl Connect<Self>);
}

/* ---------- */

/// A type implementing this trait can be connected to some [`Register`].
pub trait Connect<S: Register + ?Sized> {
    /// Sets the endpoint to reach `S`.
    fn on_connection(&mut self, endpoint: S::Endpoint);
}

/* ---------- */

impl Register for Arc<BoundedBuffer> {
    type Endpoint = Arc<BoundedBuffer>;

    #[inline]
    fn register(&mut self, other: &mut impl Connect<Self>) {
        other.on_connection(self.clone())
    }
}

impl Register for Arc<ActivityLog> {
    type Endpoint = Arc<ActivityLog>;

    #[inline]
    fn register(&mut self, other: &mut impl Connect<Self>) {
        other.on_connection(self.clone())
    }
}

/* ---------- */
