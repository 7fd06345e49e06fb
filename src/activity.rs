use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::item::Item;
use crate::Error;

/* ---------- */

/// Something that happened to an item during a run.
///
/// Its [`Display`] implementation gives the line written to the activity log and
/// [`FromStr`] parses such a line back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A producer stored an item in the buffer.
    Produced {
        /// Id of the producer.
        producer: usize,
        /// The item it stored.
        item: Item,
    },
    /// A consumer took an item out of the buffer.
    Consumed {
        /// Id of the consumer.
        consumer: usize,
        /// The item it took.
        item: Item,
    },
}

impl Event {
    /// Returns the item the event is about.
    #[inline]
    pub fn item(&self) -> Item {
        match self {
            Self::Produced { item, .. } | Self::Consumed { item, .. } => *item,
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Produced { producer, item } => write!(f, "Producer {producer} produced {item}"),
            Self::Consumed { consumer, item } => write!(f, "Consumer {consumer} consumed {item}"),
        }
    }
}

/// Returned when a line isn't a well formed activity [`Event`].
#[derive(Debug, thiserror::Error)]
#[error("malformed activity line: {0:?}")]
pub struct ParseEventError(String);

impl FromStr for Event {
    type Err = ParseEventError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseEventError(line.to_owned());

        let mut words = line.split_whitespace();
        let (Some(role), Some(id), Some(verb), Some(value), None) = (
            words.next(),
            words.next(),
            words.next(),
            words.next(),
            words.next(),
        ) else {
            return Err(malformed());
        };

        let id = id.parse().map_err(|_| malformed())?;
        let item = value.parse::<u32>().map(Item::new).map_err(|_| malformed())?;

        match (role, verb) {
            ("Producer", "produced") => Ok(Self::Produced { producer: id, item }),
            ("Consumer", "consumed") => Ok(Self::Consumed { consumer: id, item }),
            _ => Err(malformed()),
        }
    }
}

/* ---------- */

/// An append-only log duplicating every [`Event`] to all of its sinks.
///
/// Lines are written whole and in the order [`record`] is called, whatever the number of
/// threads sharing the log. A failing sink doesn't stop the others: the first error is
/// kept and returned by [`close`].
///
/// [`record`]: ActivityLog::record
/// [`close`]: ActivityLog::close
///
/// # Examples
///
/// ```
/// # use workshop::{ActivityLog, Event, Item};
/// let log = ActivityLog::new().with_sink(std::io::sink());
///
/// log.record(&Event::Produced { producer: 0, item: Item::new(4) });
/// log.close().unwrap();
/// ```
pub struct ActivityLog {
    inner: Mutex<Sinks>,
}

struct Sinks {
    sinks: Vec<Box<dyn Write + Send>>,
    failure: Option<io::Error>,
}

impl ActivityLog {
    /// Returns a log without any sink.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a log echoing events to the standard output and to the file at `path`.
    ///
    /// The file is created, or truncated if it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogFile`] if the file can't be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::LogFile {
            path: path.to_owned(),
            source,
        })?;

        log::debug!("writing activity to {}", path.display());
        Ok(Self::new()
            .with_sink(io::stdout())
            .with_sink(LineWriter::new(file)))
    }

    /// Adds a sink to the log.
    #[inline]
    pub fn with_sink<W: Write + Send + 'static>(self, sink: W) -> Self {
        let mut inner = self.inner.into_inner().unwrap_or_else(PoisonError::into_inner);
        inner.sinks.push(Box::new(sink));

        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Appends `event` as a line to every sink.
    pub fn record(&self, event: &Event) {
        let mut inner = self.lock();
        let Sinks { sinks, failure } = &mut *inner;

        for sink in sinks.iter_mut() {
            if let Err(err) = writeln!(sink, "{event}") {
                if failure.is_none() {
                    log::warn!("failed to write to an activity sink: {err}");
                    *failure = Some(err);
                }
            }
        }
    }

    /// Flushes every sink then closes them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sink`] holding the first error met while writing or flushing.
    pub fn close(self) -> Result<(), Error> {
        let mut inner = self.inner.into_inner().unwrap_or_else(PoisonError::into_inner);

        for sink in inner.sinks.iter_mut() {
            if let Err(err) = sink.flush() {
                inner.failure.get_or_insert(err);
            }
        }

        match inner.failure {
            Some(err) => Err(Error::Sink(err)),
            None => Ok(()),
        }
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, Sinks> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ActivityLog {
    #[inline]
    fn default() -> Self {
        Self {
            inner: Mutex::new(Sinks {
                sinks: Vec::new(),
                failure: None,
            }),
        }
    }
}

impl fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let inner = self.lock();

        f.debug_struct("ActivityLog")
            .field("sinks", &inner.sinks.len())
            .field("failure", &inner.failure)
            .finish()
    }
}

/* ---------- */
