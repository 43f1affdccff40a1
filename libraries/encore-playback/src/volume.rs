//! Volume level and its persistence
//!
//! Volume is a linear fraction in `[0, 1]`, the scale of the platform audio
//! primitive. The embedded widget uses `0..=100`; see [`Volume::as_percent`].

use crate::platform::VolumeStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Playback volume
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f64);

impl Volume {
    /// Full volume, the default before anything is persisted
    pub const FULL: Volume = Volume(1.0);

    /// Silence
    pub const SILENT: Volume = Volume(0.0);

    /// Create a volume, clamping into `[0, 1]`
    ///
    /// NaN is treated as full volume.
    pub fn new(fraction: f64) -> Self {
        if fraction.is_nan() {
            return Self::FULL;
        }
        Self(fraction.clamp(0.0, 1.0))
    }

    /// Parse a persisted value
    ///
    /// Unlike [`Volume::new`] this does not clamp: anything that isn't a
    /// number in `[0, 1]` is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let value: f64 = raw.trim().parse().ok()?;
        (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(Self(value))
    }

    /// Linear fraction in `[0, 1]`
    pub fn fraction(self) -> f64 {
        self.0
    }

    /// Value on a `0..=100` scale
    pub fn as_percent(self) -> f64 {
        self.0 * 100.0
    }

    /// Whether the volume is zero
    pub fn is_silent(self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remembers the user's volume across sessions
///
/// Reads tolerate a missing or corrupt value by keeping the last known good
/// volume. Write failures are logged and otherwise ignored; the in-memory
/// value is updated regardless.
pub struct VolumePersistence {
    store: Box<dyn VolumeStore>,
    key: String,
    max_age: Duration,
    current: Volume,
}

impl VolumePersistence {
    /// Persist under `key` with the given lifetime
    pub fn new(store: Box<dyn VolumeStore>, key: impl Into<String>, max_age: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            max_age,
            current: Volume::default(),
        }
    }

    /// Reload the persisted value
    pub fn load(&mut self) -> Volume {
        match self.store.read(&self.key) {
            Some(raw) => match Volume::parse(&raw) {
                Some(volume) => self.current = volume,
                None => tracing::debug!("Ignoring persisted volume {:?}", raw),
            },
            None => tracing::trace!("No persisted volume"),
        }
        self.current
    }

    /// Last known good volume
    pub fn current(&self) -> Volume {
        self.current
    }

    /// Update and persist the volume
    pub fn set(&mut self, volume: Volume) -> Volume {
        self.current = volume;
        if let Err(e) = self
            .store
            .write(&self.key, &volume.to_string(), self.max_age)
        {
            tracing::warn!("Failed to persist volume: {}", e);
        }
        volume
    }
}

/// In-memory [`VolumeStore`] for hosts without persistent storage
#[derive(Debug, Default, Clone)]
pub struct MemoryVolumeStore {
    values: HashMap<String, String>,
}

impl MemoryVolumeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: pre-populate a value
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl VolumeStore for MemoryVolumeStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str, _max_age: Duration) -> crate::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Find a cookie's value in a `document.cookie` style header
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Format a cookie assignment scoped to the whole site
pub fn format_cookie(name: &str, value: &str, max_age: Duration) -> String {
    format!("{}={}; max-age={}; path=/", name, value, max_age.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaybackError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn new_clamps() {
        assert_eq!(Volume::new(1.5).fraction(), 1.0);
        assert_eq!(Volume::new(-0.2).fraction(), 0.0);
        assert_eq!(Volume::new(f64::NAN), Volume::FULL);
        assert_eq!(Volume::new(0.35).as_percent(), 35.0);
    }

    #[test]
    fn parse_is_strict() {
        assert_eq!(Volume::parse("0.4"), Some(Volume::new(0.4)));
        assert_eq!(Volume::parse(" 1 "), Some(Volume::FULL));
        assert_eq!(Volume::parse("0"), Some(Volume::SILENT));
        assert_eq!(Volume::parse("1.2"), None);
        assert_eq!(Volume::parse("-0.1"), None);
        assert_eq!(Volume::parse("loud"), None);
        assert_eq!(Volume::parse("NaN"), None);
    }

    #[test]
    fn load_defaults_to_full() {
        let mut persistence =
            VolumePersistence::new(Box::new(MemoryVolumeStore::new()), "v", Duration::ZERO);
        assert_eq!(persistence.load(), Volume::FULL);
    }

    #[test]
    fn load_ignores_corrupt_value() {
        for raw in ["garbage", "7", ""] {
            let store = MemoryVolumeStore::new().with_value("v", raw);
            let mut persistence = VolumePersistence::new(Box::new(store), "v", Duration::ZERO);
            assert_eq!(persistence.load(), Volume::FULL, "raw value {:?}", raw);
        }
    }

    #[test]
    fn set_then_load_round_trips() {
        let store = MemoryVolumeStore::new().with_value("v", "0.25");
        let mut persistence = VolumePersistence::new(Box::new(store), "v", Duration::ZERO);
        assert_eq!(persistence.load(), Volume::new(0.25));

        persistence.set(Volume::new(0.8));
        assert_eq!(persistence.load(), Volume::new(0.8));
    }

    struct FailingStore {
        reads: Rc<RefCell<u32>>,
    }

    impl VolumeStore for FailingStore {
        fn read(&self, _key: &str) -> Option<String> {
            *self.reads.borrow_mut() += 1;
            None
        }

        fn write(&mut self, _key: &str, _value: &str, _max_age: Duration) -> crate::Result<()> {
            Err(PlaybackError::Persistence("storage disabled".to_string()))
        }
    }

    #[test]
    fn write_failure_keeps_in_memory_value() {
        let reads = Rc::new(RefCell::new(0));
        let mut persistence = VolumePersistence::new(
            Box::new(FailingStore {
                reads: reads.clone(),
            }),
            "v",
            Duration::ZERO,
        );
        persistence.set(Volume::new(0.6));
        assert_eq!(persistence.current(), Volume::new(0.6));
        assert_eq!(persistence.load(), Volume::new(0.6));
        assert_eq!(*reads.borrow(), 1);
    }

    #[test]
    fn cookie_helpers() {
        let header = "theme=dark; musicPlayerVolume=0.5; other=x=y";
        assert_eq!(cookie_value(header, "musicPlayerVolume"), Some("0.5"));
        assert_eq!(cookie_value(header, "other"), Some("x=y"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("", "musicPlayerVolume"), None);

        assert_eq!(
            format_cookie("musicPlayerVolume", "0.5", Duration::from_secs(31_536_000)),
            "musicPlayerVolume=0.5; max-age=31536000; path=/"
        );
    }
}
