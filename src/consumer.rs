use std::sync::Arc;

use crate::activity::{ActivityLog, Event};
use crate::buffer::{BoundedBuffer, Dequeued};
use crate::delay::{Delay, NoDelay};
use crate::service::Connect;
use crate::settings::Settings;
use crate::worker::{Context, ControlFlow, Worker};
use crate::Error;

/* ---------- */

/// A worker taking items out of the shared buffer.
///
/// Each iteration pauses then waits for an item. The consumer stops once the buffer reports it's
/// drained, every item of the run having been consumed by someone.
/// Every taken item is written to the activity log as `Consumer <id> consumed <value>`.
pub struct Consumer {
    id: usize,
    buffer: Arc<BoundedBuffer>,
    log: Arc<ActivityLog>,
    delay: Arc<dyn Delay>,
    taken: usize,
}

impl Worker for Consumer {
    fn on_start(&mut self) {
        log::debug!("consumer {} started", self.id);
    }

    fn on_update(&mut self) -> ControlFlow {
        self.delay.pause();

        let (consumer, log) = (self.id, &self.log);
        match self
            .buffer
            .try_dequeue(|item, _| log.record(&Event::Consumed { consumer, item }))
        {
            Dequeued::Taken { .. } => {
                self.taken += 1;
                ControlFlow::Continue
            }
            Dequeued::Drained => ControlFlow::Break,
        }
    }

    fn on_stop(&mut self) {
        log::debug!("consumer {} stopped after {} items", self.id, self.taken);
    }
}

/* ---------- */

/// Gathers what a [`Consumer`] needs before launching it.
pub struct ConsumerContext {
    id: usize,
    buffer: Option<Arc<BoundedBuffer>>,
    log: Option<Arc<ActivityLog>>,
    delay: Arc<dyn Delay>,
}

impl ConsumerContext {
    /// Returns the context of the consumer `id`, pausing with [`NoDelay`] until told otherwise.
    #[inline]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            buffer: None,
            log: None,
            delay: Arc::new(NoDelay),
        }
    }

    /// Sets the pause taken before waiting for each item.
    #[inline]
    pub fn delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }
}

impl Context for ConsumerContext {
    type Target = Consumer;

    fn into_worker(self) -> Result<Self::Target, Error> {
        let buffer = self.buffer.ok_or_else(|| Error::context("buffer"))?;
        let log = self.log.ok_or_else(|| Error::context("activity log"))?;

        Ok(Consumer {
            id: self.id,
            buffer,
            log,
            delay: self.delay,
            taken: 0,
        })
    }

    fn settings(&self) -> Settings {
        Settings::new().name(format!("consumer-{}", self.id))
    }
}

impl Connect<Arc<BoundedBuffer>> for ConsumerContext {
    fn on_connection(&mut self, endpoint: Arc<BoundedBuffer>) {
        let _ = self.buffer.insert(endpoint);
    }
}

impl Connect<Arc<ActivityLog>> for ConsumerContext {
    fn on_connection(&mut self, endpoint: Arc<ActivityLog>) {
        let _ = self.log.insert(endpoint);
    }
}

/* ---------- */
