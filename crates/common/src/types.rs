//! Domain types shared across the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Wind telemetry ────────────────────────────────────────────────────

/// One row of the 10-minute mean wind table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindReading {
    /// Station name exactly as published (English).
    pub station_name: String,
    /// 10-minute mean wind speed in km/h (>= 0).
    pub mean_speed_kmh: f64,
}

impl WindReading {
    pub fn new(station_name: impl Into<String>, mean_speed_kmh: f64) -> Self {
        Self {
            station_name: station_name.into(),
            mean_speed_kmh,
        }
    }
}

// ── Classification ────────────────────────────────────────────────────

/// Signal level implied by the reference-station wind regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    None,
    No3,
    No8,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::None => write!(f, "No signal"),
            Signal::No3 => write!(f, "No.3"),
            Signal::No8 => write!(f, "No.8"),
        }
    }
}

/// Outcome of the 8-station / 4-station threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalClassification {
    pub signal: Signal,
    /// Reference stations inside the band of `signal`. For `Signal::None`
    /// no band reached the four-station quorum, and this is the larger of
    /// the two band counts; those stations do not qualify for any signal.
    pub qualifying_station_count: usize,
}

// ── Official warning ──────────────────────────────────────────────────

/// Code used by the warning feed when no tropical cyclone signal is in force.
pub const CANCEL_CODE: &str = "CANCEL";

/// The tropical cyclone signal currently published by the Observatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialWarning {
    /// Subtype code, e.g. `TC8NW` or `CANCEL`.
    pub signal_code: String,
    pub display_name: String,
}

impl OfficialWarning {
    pub fn new(signal_code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            signal_code: signal_code.into(),
            display_name: display_name.into(),
        }
    }

    /// True when the code denotes one of the four No.8 directional signals.
    pub fn is_no8(&self) -> bool {
        self.signal_code.starts_with("TC8")
    }

    pub fn is_cancel(&self) -> bool {
        self.signal_code == CANCEL_CODE
    }

    /// Project the official code onto the computed-signal scale.
    ///
    /// No.9 and No.10 sit above the No.8 band and map to `Signal::No8`; the
    /// standby No.1 has no wind-count criterion and maps to `Signal::None`.
    pub fn level(&self) -> Signal {
        match self.signal_code.as_str() {
            code if code.starts_with("TC8") => Signal::No8,
            "TC9" | "TC10" => Signal::No8,
            "TC3" => Signal::No3,
            _ => Signal::None,
        }
    }
}

// ── Reconciliation ────────────────────────────────────────────────────

/// Computed classification set against the official signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub computed: SignalClassification,
    pub official: OfficialWarning,
    /// `(computed == No.8) == (official is a TC8 signal)`.
    pub agrees: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_official_level_mapping() {
        assert_eq!(OfficialWarning::new("TC8NE", "").level(), Signal::No8);
        assert_eq!(OfficialWarning::new("TC10", "").level(), Signal::No8);
        assert_eq!(OfficialWarning::new("TC3", "").level(), Signal::No3);
        assert_eq!(OfficialWarning::new("TC1", "").level(), Signal::None);
        assert_eq!(OfficialWarning::new(CANCEL_CODE, "").level(), Signal::None);
    }

    #[test]
    fn test_is_no8_only_matches_tc8_codes() {
        assert!(OfficialWarning::new("TC8SW", "").is_no8());
        assert!(!OfficialWarning::new("TC9", "").is_no8());
        assert!(!OfficialWarning::new("TC3", "").is_no8());
    }

    #[test]
    fn test_signal_serializes_as_upper_case() {
        assert_eq!(serde_json::to_string(&Signal::No8).unwrap(), "\"NO8\"");
        assert_eq!(serde_json::to_string(&Signal::None).unwrap(), "\"NONE\"");
        assert!(Signal::No8 > Signal::No3 && Signal::No3 > Signal::None);
    }
}
