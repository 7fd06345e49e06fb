use std::sync::Arc;

use crate::activity::ActivityLog;
use crate::buffer::BoundedBuffer;
use crate::config::Config;
use crate::consumer::ConsumerContext;
use crate::delay::{Delay, NoDelay, RandomDelay};
use crate::producer::ProducerContext;
use crate::runtime::Runtime;
use crate::service::Register;
use crate::Error;

/* ---------- */

/// Final counts of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Number of items produced.
    pub produced: usize,
    /// Number of items consumed.
    pub consumed: usize,
    /// Number of items the run had to go through.
    pub target: usize,
}

impl Report {
    /// Returns `true` if exactly the target was produced and consumed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.produced == self.target && self.consumed == self.target
    }
}

/* ---------- */

/// Sets a whole run up, launches every worker and waits for all of them.
///
/// # Examples
///
/// ```
/// # use std::num::NonZeroUsize;
/// # use std::time::Duration;
/// # use workshop::*;
/// let two = NonZeroUsize::new(2).unwrap();
/// let config = Config::new(two, two, two).max_delay(Duration::ZERO);
///
/// let report = Coordinator::new(config)
///     .activity_log(ActivityLog::new())
///     .run()
///     .unwrap();
///
/// assert!(report.is_complete());
/// ```
pub struct Coordinator {
    config: Config,
    log: Option<ActivityLog>,
    delay: Arc<dyn Delay>,
}

impl Coordinator {
    /// Returns a coordinator for the run described by `config`.
    ///
    /// Unless told otherwise, activity goes to the standard output and to `config.output`, and
    /// workers pause randomly up to `config.max_delay` before each item.
    pub fn new(config: Config) -> Self {
        let delay: Arc<dyn Delay> = if config.max_delay.is_zero() {
            Arc::new(NoDelay)
        } else {
            Arc::new(RandomDelay::new(config.max_delay))
        };

        Self {
            config,
            log: None,
            delay,
        }
    }

    /// Uses `log` instead of creating the activity file.
    #[inline]
    pub fn activity_log(mut self, log: ActivityLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Sets the pause workers take before each item.
    #[inline]
    pub fn delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Runs every worker until the target is produced and consumed.
    ///
    /// The activity log is opened before any worker is launched and closed once all of them were joined.
    ///
    /// # Errors
    ///
    /// - [`Error::LogFile`] if the activity file can't be created, nothing is launched then.
    /// - [`Error::ThreadStart`] if a worker thread can't be spawned. The workers already launched are
    ///   stopped and joined first.
    /// - [`Error::WorkerPanicked`] if a worker panicked.
    /// - [`Error::Sink`] if the activity couldn't be written entirely.
    pub fn run(self) -> Result<Report, Error> {
        let Self { config, log, delay } = self;

        let log = match log {
            Some(log) => log,
            None => ActivityLog::create(&config.output)?,
        };

        let mut log = Arc::new(log);
        let mut buffer = Arc::new(BoundedBuffer::new(config.capacity, config.target));
        let mut runtime = Runtime::new();

        log::info!(
            "launching {} producers and {} consumers around a buffer of {} for {} items",
            config.producers,
            config.consumers,
            config.capacity,
            config.target
        );

        if let Err(err) = launch_all(&mut runtime, &config, &delay, &mut buffer, &mut log) {
            log::error!("failed to launch every worker: {err}");
            if let Err(panicked) = stop_launched(&mut runtime, &buffer) {
                log::error!("while stopping the launched workers: {panicked}");
            }
            return Err(err);
        }

        runtime.wait()?;

        let snapshot = buffer.snapshot();
        let report = Report {
            produced: snapshot.produced,
            consumed: snapshot.consumed,
            target: snapshot.target,
        };

        // Every worker was joined, nothing else holds the log anymore.
        match Arc::try_unwrap(log) {
            Ok(log) => log.close()?,
            Err(_) => log::warn!("the activity log is still shared, it won't be flushed"),
        }

        log::info!(
            "run completed: {} produced, {} consumed",
            report.produced,
            report.consumed
        );
        Ok(report)
    }
}

fn launch_all(
    runtime: &mut Runtime,
    config: &Config,
    delay: &Arc<dyn Delay>,
    buffer: &mut Arc<BoundedBuffer>,
    log: &mut Arc<ActivityLog>,
) -> Result<(), Error> {
    for id in 0..config.producers.get() {
        let mut ctx = ProducerContext::new(id).delay(delay.clone());
        if let Some(seed) = config.seed {
            ctx = ctx.seed(seed.wrapping_add(id as u64));
        }

        buffer.register(&mut ctx);
        log.register(&mut ctx);
        runtime.launch_from_context(ctx)?;
    }

    for id in 0..config.consumers.get() {
        let mut ctx = ConsumerContext::new(id).delay(delay.clone());

        buffer.register(&mut ctx);
        log.register(&mut ctx);
        runtime.launch_from_context(ctx)?;
    }

    Ok(())
}

/// Stops the workers launched before the run failed to be set up entirely, and joins them.
fn stop_launched(runtime: &mut Runtime, buffer: &BoundedBuffer) -> Result<(), Error> {
    if runtime.is_empty() {
        return Ok(());
    }

    buffer.close();
    runtime.wait()
}

/* ---------- */
