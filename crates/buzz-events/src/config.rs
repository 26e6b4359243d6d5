//! Bus configuration.

/// Settings for an [`EventBus`](crate::EventBus).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Label attached to every log record the bus emits.
    pub name: String,
    /// Catch listener panics and report them as
    /// [`ListenerError::Panicked`](crate::ListenerError::Panicked). When
    /// off, a panicking listener unwinds through `emit`.
    pub catch_panics: bool,
}

impl BusConfig {
    /// Create a config with the given name and default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set whether listener panics are caught.
    #[must_use]
    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            name: "default".to_owned(),
            catch_panics: true,
        }
    }
}

#[cfg(feature = "config")]
impl From<&buzz_config::BusSection> for BusConfig {
    fn from(section: &buzz_config::BusSection) -> Self {
        Self {
            name: section.name.clone(),
            catch_panics: section.catch_panics,
        }
    }
}
