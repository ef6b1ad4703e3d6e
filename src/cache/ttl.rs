//! TTL presets for the tool layer.

use std::time::Duration;

/// Named TTL policies, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlPreset {
    /// Static reference data (24h).
    Static,
    /// Semi-static lists (1h).
    Medium,
    /// Occasionally-changing data (15 min); the store default.
    Short,
    /// Live data (1 min).
    Realtime,
}

impl TtlPreset {
    pub const fn minutes(self) -> u64 {
        match self {
            TtlPreset::Static => 1440,
            TtlPreset::Medium => 60,
            TtlPreset::Short => 15,
            TtlPreset::Realtime => 1,
        }
    }

    pub const fn duration(self) -> Duration {
        Duration::from_secs(self.minutes() * 60)
    }
}

impl From<TtlPreset> for Duration {
    fn from(preset: TtlPreset) -> Self {
        preset.duration()
    }
}

/// Convert (possibly fractional) minutes to a duration.
///
/// Zero, negative or NaN input is zero. Values too large for a [`Duration`],
/// including `+inf`, saturate to [`Duration::MAX`].
pub fn ttl_from_minutes(minutes: f64) -> Duration {
    if minutes.is_nan() || minutes <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(minutes * 60.0).unwrap_or(Duration::MAX)
}

/// Strict variant of [`ttl_from_minutes`] for configuration input: `None` unless
/// `minutes` is finite, positive and representable.
pub fn try_ttl_from_minutes(minutes: f64) -> Option<Duration> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(minutes * 60.0).ok()
}
