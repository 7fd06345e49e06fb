use std::thread::Builder;

/* ---------- */

/// Used to configure the properties of a new worker's thread.
#[derive(Debug, Default, Clone)]
pub struct Settings {
    name: Option<String>,
}

impl Settings {
    /// Returns the base [`Settings`] with default parameters.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the thread's name.
    ///
    /// The name must not contains null bytes (`\0`).
    #[inline]
    pub fn name<T: ToString>(mut self, name: T) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Returns the thread's name, if set.
    #[inline]
    pub fn thread_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the [`std::thread::Builder`] configured with those settings.
    #[inline]
    pub(crate) fn into_builder(self) -> Builder {
        match self.name {
            Some(name) => Builder::new().name(name),
            None => Builder::new(),
        }
    }
}
