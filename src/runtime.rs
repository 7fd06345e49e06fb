use std::thread::JoinHandle;

use crate::settings::Settings;
use crate::worker::{Context, Worker};
use crate::Error;

/* ---------- */

/// A runtime that manages [`Workers`] threads.
///
/// Each worker runs on its own OS thread until it breaks out of its loop. A runtime never stops its
/// workers: [`Runtime::wait`] blocks until all of them are done, and so does dropping the runtime.
///
/// [`Workers`]: crate::Worker
pub struct Runtime {
    threads: Vec<WorkerHandle>,
}

struct WorkerHandle {
    name: String,
    thread: JoinHandle<()>,
}

impl Runtime {
    /// Returns a new runtime.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no worker is left to join.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Runs a [`Worker`] in a new thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ThreadStart`] if the thread couldn't be spawned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use workshop::*;
    /// struct Employee;
    /// // -- skipping the Worker implementation for Employee...
    /// # impl Worker for Employee {}
    ///
    /// let mut runtime = Runtime::new();
    ///
    /// // Run a Employee thread.
    /// runtime.launch(Employee).unwrap();
    /// ```
    #[inline]
    pub fn launch<W: Worker + 'static>(&mut self, worker: W) -> Result<(), Error> {
        self.launch_with_settings(worker, Settings::default())
    }

    /// Runs a [`Worker`] in a new thread configured with `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ThreadStart`] if the thread couldn't be spawned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use workshop::*;
    /// struct Employee;
    /// // -- skipping the Worker implementation for Employee...
    /// # impl Worker for Employee {}
    ///
    /// let mut runtime = Runtime::new();
    /// let settings = Settings::new().name("alice");
    ///
    /// // Run a Employee thread named "alice".
    /// runtime.launch_with_settings(Employee, settings).unwrap();
    /// ```
    pub fn launch_with_settings<W: Worker + 'static>(
        &mut self,
        mut worker: W,
        settings: Settings,
    ) -> Result<(), Error> {
        let name = settings
            .thread_name()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("worker-{}", self.threads.len()));

        let thread = settings.into_builder().spawn(move || worker.run())?;

        log::trace!("launched {name}");
        self.threads.push(WorkerHandle { name, thread });
        Ok(())
    }

    /// Runs a [`Worker`] built from a [`Context`] in a new thread.
    ///
    /// The new thread will be configured using the values returned by the [`Context::settings`] function.
    ///
    /// # Errors
    ///
    /// Returns the context's error if the worker couldn't be built, or [`Error::ThreadStart`] if the
    /// thread couldn't be spawned.
    #[inline]
    pub fn launch_from_context<W, C>(&mut self, ctx: C) -> Result<(), Error>
    where
        W: Worker + 'static,
        C: Context<Target = W>,
    {
        let settings = ctx.settings();
        let worker = ctx.into_worker()?;

        self.launch_with_settings(worker, settings)
    }

    /// Blocks the calling thread until all the runtime's workers stop.
    ///
    /// Workers are joined in the order they were launched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] naming the first worker that panicked, once every worker was joined.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::time::{Duration, Instant};
    /// # use workshop::*;
    /// struct Employee;
    ///
    /// impl Worker for Employee {
    ///     fn on_update(&mut self) -> ControlFlow {
    ///         // Let's simulate some work.
    ///         std::thread::sleep(Duration::from_millis(100));
    ///
    ///         ControlFlow::Break
    ///     }
    /// }
    ///
    /// let mut runtime = Runtime::new();
    /// let now = Instant::now();
    ///
    /// runtime.launch(Employee).unwrap();
    /// runtime.wait().unwrap();
    ///
    /// assert!(now.elapsed() >= Duration::from_millis(100));
    /// ```
    pub fn wait(&mut self) -> Result<(), Error> {
        let mut panicked = None;

        for WorkerHandle { name, thread } in self.threads.drain(..) {
            if thread.join().is_err() {
                log::error!("{name} panicked");
                panicked.get_or_insert(name);
            }
        }

        match panicked {
            Some(name) => Err(Error::WorkerPanicked(name)),
            None => Ok(()),
        }
    }
}

impl Default for Runtime {
    #[inline]
    fn default() -> Self {
        Self {
            threads: Vec::new(),
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let _ = self.wait();
    }
}

/* ---------- */
