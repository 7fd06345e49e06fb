use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, Sender};

use crate::{Context, ControlFlow, Error, Event, Worker};

/* ---------- */

pub(crate) fn nz(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).expect("zero isn't allowed here")
}

/// Runs `f` on its own thread, failing the test if it doesn't return within `timeout`.
pub(crate) fn within<T, F>(timeout: Duration, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, recver) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let _ = sender.send(f());
    });

    match recver.recv_timeout(timeout) {
        Ok(res) => res,
        Err(RecvTimeoutError::Timeout) => panic!("deadlock: still running after {timeout:?}"),
        Err(RecvTimeoutError::Disconnected) => panic!("the guarded closure panicked"),
    }
}

/* ---------- */

/// An in-memory activity sink whose clones share the same bytes.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemorySink(Arc<Mutex<Vec<u8>>>);

impl MemorySink {
    pub(crate) fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(ToOwned::to_owned)
            .collect()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.lines()
            .iter()
            .map(|line| line.parse().expect("malformed activity line"))
            .collect()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/* ---------- */

pub(crate) struct TestTimedWorker {
    timeout: Duration,
    now: Instant,
}

impl TestTimedWorker {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            now: Instant::now(),
        }
    }
}

impl Worker for TestTimedWorker {
    fn on_start(&mut self) {
        self.now = Instant::now();
    }

    fn on_update(&mut self) -> ControlFlow {
        if self.now.elapsed() >= self.timeout {
            return ControlFlow::Break;
        }

        std::thread::sleep(Duration::from_millis(1));
        ControlFlow::Continue
    }
}

/* ---------- */

pub(crate) struct TestNamedWorker(Sender<String>);

impl TestNamedWorker {
    pub(crate) fn new(sender: Sender<String>) -> Self {
        Self(sender)
    }
}

impl Worker for TestNamedWorker {
    fn on_update(&mut self) -> ControlFlow {
        let name = std::thread::current().name().unwrap_or_default().to_owned();
        self.0.send(name).unwrap();
        ControlFlow::Break
    }
}

/* ---------- */

pub(crate) struct TestPanickingWorker;

impl Worker for TestPanickingWorker {
    fn on_update(&mut self) -> ControlFlow {
        panic!("panicking on purpose")
    }
}

/* ---------- */

pub(crate) struct BadWorker;

impl Worker for BadWorker {}

pub(crate) struct BadWorkerContext;

impl Context for BadWorkerContext {
    type Target = BadWorker;

    fn into_worker(self) -> Result<Self::Target, Error> {
        Err(Error::context("bad context"))
    }
}
