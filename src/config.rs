use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::Error;

/* ---------- */

/// Number of items a run goes through unless told otherwise.
pub const DEFAULT_TARGET: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(target) => target,
    None => panic!("the default target can't be zero"),
};

/// Upper bound of the pause workers take before each item, unless told otherwise.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(DEFAULT_MAX_DELAY_MS);

/// Path of the activity file, unless told otherwise.
pub const DEFAULT_OUTPUT: &str = "output.txt";

const DEFAULT_MAX_DELAY_MS: u64 = 1_000;

/* ---------- */

/// Producers and consumers sharing a bounded buffer, one OS thread per worker.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Number of producers to launch.
    #[arg(value_name = "number_of_producers")]
    producers: NonZeroUsize,

    /// Number of consumers to launch.
    #[arg(value_name = "number_of_consumers")]
    consumers: NonZeroUsize,

    /// Capacity of the shared buffer.
    #[arg(value_name = "buffer_size")]
    capacity: NonZeroUsize,

    /// Number of items to produce and consume.
    #[arg(long, env = "WORKSHOP_TARGET", default_value_t = DEFAULT_TARGET)]
    target: NonZeroUsize,

    /// Upper bound of the pause taken before each item, in milliseconds. 0 disables pauses.
    #[arg(long, env = "WORKSHOP_MAX_DELAY_MS", default_value_t = DEFAULT_MAX_DELAY_MS)]
    max_delay_ms: u64,

    /// Path of the activity file, truncated at the start of the run.
    #[arg(long, env = "WORKSHOP_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Seed of the item values, random if unset.
    #[arg(long, env = "WORKSHOP_SEED")]
    seed: Option<u64>,
}

/* ---------- */

/// Everything needed to set a run up.
///
/// The worker counts and the buffer capacity come from the command line, the rest has defaults
/// that can be overridden through options or the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of producers to launch.
    pub producers: NonZeroUsize,
    /// Number of consumers to launch.
    pub consumers: NonZeroUsize,
    /// Capacity of the shared buffer.
    pub capacity: NonZeroUsize,
    /// Number of items to produce and consume.
    pub target: NonZeroUsize,
    /// Upper bound of the pause workers take before each item.
    pub max_delay: Duration,
    /// Path of the activity file.
    pub output: PathBuf,
    /// Seed of the item values, random if `None`.
    pub seed: Option<u64>,
}

impl Config {
    /// Returns a configuration with default values for everything but the counts.
    pub fn new(producers: NonZeroUsize, consumers: NonZeroUsize, capacity: NonZeroUsize) -> Self {
        Self {
            producers,
            consumers,
            capacity,
            target: DEFAULT_TARGET,
            max_delay: DEFAULT_MAX_DELAY,
            output: PathBuf::from(DEFAULT_OUTPUT),
            seed: None,
        }
    }

    /// Parses the command line, program name included.
    ///
    /// Three positive integers are expected: the number of producers, the number of consumers
    /// and the capacity of the buffer. Every other setting is an option that can also be set
    /// through the environment:
    ///
    /// | Option           | Variable                | Default      |
    /// |------------------|-------------------------|--------------|
    /// | `--target`       | `WORKSHOP_TARGET`       | 10           |
    /// | `--max-delay-ms` | `WORKSHOP_MAX_DELAY_MS` | 1000         |
    /// | `--output`       | `WORKSHOP_OUTPUT`       | `output.txt` |
    /// | `--seed`         | `WORKSHOP_SEED`         | random       |
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a value isn't what's expected, or [`Error::Usage`]
    /// for any other malformed command line and when help or version was asked for.
    ///
    /// # Examples
    ///
    /// ```
    /// # use workshop::Config;
    /// let config = Config::from_args(["workshop", "2", "3", "5"]).unwrap();
    /// assert_eq!(config.producers.get(), 2);
    /// assert_eq!(config.consumers.get(), 3);
    /// assert_eq!(config.capacity.get(), 5);
    ///
    /// assert!(Config::from_args(["workshop", "2", "3"]).unwrap_err().is_usage());
    /// assert!(Config::from_args(["workshop", "2", "3", "0"]).unwrap_err().is_usage());
    /// ```
    pub fn from_args<I, T>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = Args::try_parse_from(args)?;

        Ok(Self {
            producers: args.producers,
            consumers: args.consumers,
            capacity: args.capacity,
            target: args.target,
            max_delay: Duration::from_millis(args.max_delay_ms),
            output: args.output,
            seed: args.seed,
        })
    }

    /// Sets the number of items to produce and consume.
    #[inline]
    pub fn target(mut self, target: NonZeroUsize) -> Self {
        self.target = target;
        self
    }

    /// Sets the upper bound of the pause workers take before each item.
    #[inline]
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Sets the path of the activity file.
    #[inline]
    pub fn output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }

    /// Seeds the item values.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/* ---------- */
