use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activity::{ActivityLog, Event};
use crate::buffer::{BoundedBuffer, Enqueued};
use crate::delay::{Delay, NoDelay};
use crate::item::Item;
use crate::service::Connect;
use crate::settings::Settings;
use crate::worker::{Context, ControlFlow, Worker};
use crate::Error;

/* ---------- */

/// A worker manufacturing items and storing them in the shared buffer.
///
/// Each iteration pauses, draws a random [`Item`] and offers it to the buffer. The producer stops
/// the first time the buffer rejects an item, meaning the run's target was already reached.
/// Every stored item is written to the activity log as `Producer <id> produced <value>`.
pub struct Producer {
    id: usize,
    buffer: Arc<BoundedBuffer>,
    log: Arc<ActivityLog>,
    delay: Arc<dyn Delay>,
    rng: StdRng,
    stored: usize,
}

impl Worker for Producer {
    fn on_start(&mut self) {
        log::debug!("producer {} started", self.id);
    }

    fn on_update(&mut self) -> ControlFlow {
        self.delay.pause();

        let item = Item::random(&mut self.rng);
        let (producer, log) = (self.id, &self.log);

        match self
            .buffer
            .try_enqueue(item, |item, _| log.record(&Event::Produced { producer, item }))
        {
            Enqueued::Stored { .. } => {
                self.stored += 1;
                ControlFlow::Continue
            }
            Enqueued::Rejected(_) => ControlFlow::Break,
        }
    }

    fn on_stop(&mut self) {
        log::debug!("producer {} stopped after {} items", self.id, self.stored);
    }
}

/* ---------- */

/// Gathers what a [`Producer`] needs before launching it.
///
/// The buffer and the activity log are connected through [`Register`]; building the producer
/// fails if either is missing.
///
/// [`Register`]: crate::Register
pub struct ProducerContext {
    id: usize,
    buffer: Option<Arc<BoundedBuffer>>,
    log: Option<Arc<ActivityLog>>,
    delay: Arc<dyn Delay>,
    seed: Option<u64>,
}

impl ProducerContext {
    /// Returns the context of the producer `id`, pausing with [`NoDelay`] until told otherwise.
    #[inline]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            buffer: None,
            log: None,
            delay: Arc::new(NoDelay),
            seed: None,
        }
    }

    /// Sets the pause taken before each item.
    #[inline]
    pub fn delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Seeds the item values, making them reproducible.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Context for ProducerContext {
    type Target = Producer;

    fn into_worker(self) -> Result<Self::Target, Error> {
        let buffer = self.buffer.ok_or_else(|| Error::context("buffer"))?;
        let log = self.log.ok_or_else(|| Error::context("activity log"))?;
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Producer {
            id: self.id,
            buffer,
            log,
            delay: self.delay,
            rng,
            stored: 0,
        })
    }

    fn settings(&self) -> Settings {
        Settings::new().name(format!("producer-{}", self.id))
    }
}

impl Connect<Arc<BoundedBuffer>> for ProducerContext {
    fn on_connection(&mut self, endpoint: Arc<BoundedBuffer>) {
        let _ = self.buffer.insert(endpoint);
    }
}

impl Connect<Arc<ActivityLog>> for ProducerContext {
    fn on_connection(&mut self, endpoint: Arc<ActivityLog>) {
        let _ = self.log.insert(endpoint);
    }
}

/* ---------- */
