use crate::settings::Settings;
use crate::Error;

/* ---------- */

/// A worker is a loop running on its own thread until it decides it's done.
///
/// Types that implement the [`Worker`] trait are called `workers`. Workers don't depend on the runtime where
/// they are launched to do their job, the data to work on being provided by the type itself. Nothing
/// from the outside can stop a worker: it leaves its loop once [`Worker::on_update`] returns [`ControlFlow::Break`].
///
/// Workers are defined by one main method, [`Worker::run`], which runs the actual loop. Its default
/// implementation calls [`Worker::on_start`] once, then [`Worker::on_update`] until it returns
/// [`ControlFlow::Break`], and finally [`Worker::on_stop`] once.
///
/// # Examples
///
/// A worker that counts the number of time its update method has been called and stops at 10:
///
/// ```
/// # use workshop::*;
/// #[derive(Debug, Default)]
/// struct Counter {
///     count: usize
/// }
///
/// impl Worker for Counter {
///     fn on_update(&mut self) -> ControlFlow {
///         self.count += 1;
///
///         if self.count == 10 {
///             return ControlFlow::Break;
///         }
///
///         ControlFlow::Continue
///     }
///
///     fn on_stop(&mut self) {
///         println!("num updates: {}", self.count);
///     }
/// }
///
/// let mut runtime = Runtime::new();
/// runtime.launch(Counter::default()).unwrap();
/// runtime.wait().unwrap();
/// ```
pub trait Worker: Send {
    /// Called once, on the worker's thread, before entering the loop.
    ///
    /// By default, this does nothing.
    #[inline]
    fn on_start(&mut self) {}

    /// Does one iteration of the worker loop.
    ///
    /// By default, this method just returns [`ControlFlow::Break`].
    #[inline]
    fn on_update(&mut self) -> ControlFlow {
        ControlFlow::Break
    }

    /// Called once, on the worker's thread, after leaving the loop.
    ///
    /// By default, this does nothing.
    #[inline]
    fn on_stop(&mut self) {}

    /// Main worker loop, spawned in a new thread by the runtime.
    #[inline]
    fn run(&mut self) {
        self.on_start();

        while let ControlFlow::Continue = self.on_update() {}

        self.on_stop();
    }
}

/* ---------- */

/// Allow building a worker before actually launching it with the [`Runtime::launch_from_context`] function.
///
/// Contexts gather what a worker needs, typically its shared state, in a builder pattern way. Building
/// fails if something is missing.
///
/// [`Runtime::launch_from_context`]: crate::Runtime::launch_from_context
///
/// # Examples
///
/// ```
/// # use workshop::*;
/// struct Greeter(String);
/// impl Worker for Greeter {
///     fn on_update(&mut self) -> ControlFlow {
///         println!("Hello, {}!", self.0);
///         ControlFlow::Break
///     }
/// }
///
/// #[derive(Default)]
/// struct GreeterContext {
///     name: Option<String>,
/// }
///
/// impl Context for GreeterContext {
///     type Target = Greeter;
///
///     fn into_worker(self) -> Result<Self::Target, Error> {
///         let name = self.name.ok_or(Error::InvalidContext("name".to_owned()))?;
///         Ok(Greeter(name))
///     }
///
///     fn settings(&self) -> Settings {
///         Settings::new().name("greeter")
///     }
/// }
///
/// let mut runtime = Runtime::new();
///
/// assert!(runtime.launch_from_context(GreeterContext::default()).is_err());
///
/// let context = GreeterContext { name: Some("Alice".to_owned()) };
/// runtime.launch_from_context(context).unwrap();
/// runtime.wait().unwrap();
/// ```
pub trait Context {
    /// The type of [`Worker`] built from this context.
    type Target: Worker;

    /// Consumes `self` to build the targeted [`Worker`] from the context.
    fn into_worker(self) -> Result<Self::Target, Error>;

    /// Returns some [`Settings`] used to configure the worker's thread.
    ///
    /// By default, it returns default thread settings.
    #[inline]
    fn settings(&self) -> Settings {
        Settings::default()
    }
}

/* ---------- */

/// Defines the control flow of [`Workers`].
///
/// [`Workers`]: crate::Worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    /// Tells the runtime to continue the main worker loop.
    Continue,
    /// Tells the runtime to break the main worker loop.
    Break,
}

/* ---------- */
