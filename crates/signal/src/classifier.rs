//! Threshold rule mapping reference-station wind speeds to a signal.
//!
//! Bands are the Observatory's published km/h ranges: strong winds
//! 41-62 km/h for No.3, gale or storm force 63-117 km/h for No.8. Each
//! band is inclusive at the lower bound and exclusive at the upper. Speeds
//! at or above 117 km/h are hurricane force and count toward neither band.

use std::ops::Range;

use common::{Signal, SignalClassification, WindReading};

/// Strong wind band for No.3 (km/h).
pub const NO3_BAND_KMH: Range<f64> = 41.0..63.0;

/// Gale or storm force band for No.8 (km/h).
pub const NO8_BAND_KMH: Range<f64> = 63.0..117.0;

/// Reference stations that must sit inside a band for its signal.
pub const MIN_QUALIFYING_STATIONS: usize = 4;

/// Classify a set of (already filtered) reference readings.
pub fn classify(readings: &[WindReading]) -> SignalClassification {
    let count_in = |band: &Range<f64>| {
        readings
            .iter()
            .filter(|r| band.contains(&r.mean_speed_kmh))
            .count()
    };
    let count8 = count_in(&NO8_BAND_KMH);
    let count3 = count_in(&NO3_BAND_KMH);

    if count8 >= MIN_QUALIFYING_STATIONS {
        SignalClassification {
            signal: Signal::No8,
            qualifying_station_count: count8,
        }
    } else if count3 >= MIN_QUALIFYING_STATIONS {
        SignalClassification {
            signal: Signal::No3,
            qualifying_station_count: count3,
        }
    } else {
        SignalClassification {
            signal: Signal::None,
            qualifying_station_count: count8.max(count3),
        }
    }
}
