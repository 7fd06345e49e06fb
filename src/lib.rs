//! Producers and consumers sharing a bounded buffer, each of them running on its own thread.
//!
//! # Philosophy
//!
//! This crate sees threads as unique entities called `workers`: loops running on their own OS thread
//! until they decide, by themselves, that their job is done. Nothing stops a worker from the outside.
//!
//! A run is made of a fixed number of producers and consumers around a single [`BoundedBuffer`]:
//! - producers draw random [`Items`] and store them in the buffer, blocking while it's full.
//! - consumers take the items out of the buffer in FIFO order, blocking while it's empty.
//! - every stored and taken item is written as a line to an [`ActivityLog`].
//!
//! The run is over once a target number of items was both produced and consumed. Workers finding
//! the target already met leave their loop, but only after handing the signal they were woken up by
//! to a sibling, so that no worker is ever left blocked.
//!
//! [`Items`]: crate::Item
//!
//! # Usage
//!
//! The [`Coordinator`] sets a whole run up from a [`Config`]:
//!
//! ```
//! # use std::num::NonZeroUsize;
//! # use std::time::Duration;
//! # use workshop::*;
//! let producers = NonZeroUsize::new(3).unwrap();
//! let consumers = NonZeroUsize::new(2).unwrap();
//! let capacity = NonZeroUsize::new(4).unwrap();
//!
//! let config = Config::new(producers, consumers, capacity).max_delay(Duration::ZERO);
//! let report = Coordinator::new(config)
//!     .activity_log(ActivityLog::new().with_sink(std::io::sink()))
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(report.produced, 10);
//! assert_eq!(report.consumed, 10);
//! ```
//!
//! # Workers and runtimes
//!
//! Producers and consumers are plain [`Workers`] launched in a [`Runtime`], which can run any other worker.
//!
//! ```
//! # use workshop::{Runtime, Worker, ControlFlow};
//! struct WorkerThatPrints(usize);
//! impl Worker for WorkerThatPrints {
//!     fn on_update(&mut self) -> ControlFlow {
//!         println!("Hello, World!");
//!
//!         self.0 -= 1;
//!         match self.0 {
//!             0 => ControlFlow::Break,
//!             _ => ControlFlow::Continue,
//!         }
//!     }
//! }
//!
//! let mut runtime = Runtime::new();
//!
//! runtime.launch(WorkerThatPrints(3)).unwrap();
//! runtime.wait().unwrap();
//! ```
//!
//! [`Workers`]: crate::Worker
//!
//! ## Contextes
//!
//! Workers are usually configured via a builder pattern before being launched: a type that implements
//! the [`Context`] trait gathers what the worker needs, then the [`Runtime::launch_from_context`] function
//! builds and launches it. The shared state of a run is handed to contexts through the [`Register`] and
//! [`Connect`] traits.
//!
//! ```
//! # use std::num::NonZeroUsize;
//! # use std::sync::Arc;
//! # use workshop::*;
//! let capacity = NonZeroUsize::new(1).unwrap();
//! let target = NonZeroUsize::new(5).unwrap();
//!
//! let mut buffer = Arc::new(BoundedBuffer::new(capacity, target));
//! let mut log = Arc::new(ActivityLog::new());
//!
//! let mut producer = ProducerContext::new(0);
//! let mut consumer = ConsumerContext::new(0);
//!
//! buffer.register(&mut producer);
//! buffer.register(&mut consumer);
//! log.register(&mut producer);
//! log.register(&mut consumer);
//!
//! let mut runtime = Runtime::new();
//! runtime.launch_from_context(producer).unwrap();
//! runtime.launch_from_context(consumer).unwrap();
//! runtime.wait().unwrap();
//!
//! assert!(buffer.is_complete());
//! ```
//!
//! ## Delays
//!
//! Workers pause before each item to simulate some work. Pauses are purely cosmetic and can be replaced
//! through the [`Delay`] trait; [`NoDelay`] runs as fast as possible.

#![warn(missing_docs)]

mod activity;
mod buffer;
mod config;
mod consumer;
mod coordinator;
mod counter;
mod delay;
mod error;
mod item;
mod producer;
mod runtime;
mod service;
mod settings;
#[cfg(test)]
mod test_utils;
mod worker;

pub use activity::*;
pub use buffer::*;
pub use config::*;
pub use consumer::*;
pub use coordinator::*;
pub use counter::*;
pub use delay::*;
pub use error::*;
pub use item::*;
pub use producer::*;
pub use runtime::*;
pub use service::*;
pub use settings::*;
pub use worker::*;
