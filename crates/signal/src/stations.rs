//! The eight-station reference network used for the No.3 / No.8 criteria.

use std::collections::HashSet;
use std::fmt;

use common::WindReading;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReferenceStation {
    #[serde(rename = "Kai Tak")]
    KaiTak,
    #[serde(rename = "Tsing Yi")]
    TsingYi,
    #[serde(rename = "Cheung Chau")]
    CheungChau,
    #[serde(rename = "Sha Tin")]
    ShaTin,
    #[serde(rename = "Lau Fau Shan")]
    LauFauShan,
    #[serde(rename = "Ta Kwu Ling")]
    TaKwuLing,
    #[serde(rename = "Chek Lap Kok")]
    ChekLapKok,
    #[serde(rename = "Sai Kung")]
    SaiKung,
}

impl ReferenceStation {
    pub const ALL: [ReferenceStation; 8] = [
        ReferenceStation::KaiTak,
        ReferenceStation::TsingYi,
        ReferenceStation::CheungChau,
        ReferenceStation::ShaTin,
        ReferenceStation::LauFauShan,
        ReferenceStation::TaKwuLing,
        ReferenceStation::ChekLapKok,
        ReferenceStation::SaiKung,
    ];

    /// Station name as it appears in the wind feed.
    pub fn name(self) -> &'static str {
        match self {
            ReferenceStation::KaiTak => "Kai Tak",
            ReferenceStation::TsingYi => "Tsing Yi",
            ReferenceStation::CheungChau => "Cheung Chau",
            ReferenceStation::ShaTin => "Sha Tin",
            ReferenceStation::LauFauShan => "Lau Fau Shan",
            ReferenceStation::TaKwuLing => "Ta Kwu Ling",
            ReferenceStation::ChekLapKok => "Chek Lap Kok",
            ReferenceStation::SaiKung => "Sai Kung",
        }
    }

    /// Exact, case-sensitive match against the feed name.
    pub fn from_name(name: &str) -> Option<ReferenceStation> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for ReferenceStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keep only reference-station readings, in input order.
///
/// A station listed more than once keeps its first reading, so the result
/// never exceeds eight entries.
pub fn select_reference(readings: &[WindReading]) -> Vec<WindReading> {
    let mut seen = HashSet::new();
    readings
        .iter()
        .filter(|r| {
            ReferenceStation::from_name(&r.station_name)
                .map(|station| seen.insert(station))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Reference stations with no reading in this snapshot.
pub fn missing_reference_stations(readings: &[WindReading]) -> Vec<ReferenceStation> {
    let present: HashSet<ReferenceStation> = readings
        .iter()
        .filter_map(|r| ReferenceStation::from_name(&r.station_name))
        .collect();
    ReferenceStation::ALL
        .into_iter()
        .filter(|s| !present.contains(s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(name: &str, speed: f64) -> WindReading {
        WindReading::new(name, speed)
    }

    fn full_network(speed: f64) -> Vec<WindReading> {
        ReferenceStation::ALL
            .iter()
            .map(|s| reading(s.name(), speed))
            .collect()
    }

    #[test]
    fn test_drops_non_reference_stations_and_keeps_order() {
        let input = vec![
            reading("Green Island", 110.0),
            reading("Sha Tin", 40.0),
            reading("Waglan Island", 95.0),
            reading("Kai Tak", 55.0),
        ];
        let selected = select_reference(&input);
        assert_eq!(selected, vec![reading("Sha Tin", 40.0), reading("Kai Tak", 55.0)]);
    }

    #[test]
    fn test_full_network_passes_through() {
        let input = full_network(20.0);
        assert_eq!(select_reference(&input), input);
    }

    #[test]
    fn test_never_more_than_eight() {
        let mut input = full_network(20.0);
        input.push(reading("Kai Tak", 99.0));
        let selected = select_reference(&input);
        assert_eq!(selected.len(), 8);
        assert_eq!(selected[0], reading("Kai Tak", 20.0));
    }

    #[test]
    fn test_name_match_is_exact() {
        let input = vec![reading("kai tak", 70.0), reading("Kai Tak ", 70.0), reading("Sai Kung", 70.0)];
        assert_eq!(select_reference(&input), vec![reading("Sai Kung", 70.0)]);
    }

    #[test]
    fn test_select_reference_is_idempotent() {
        let mut input = full_network(50.0);
        input.insert(3, reading("Star Ferry", 30.0));
        input.push(reading("Tsing Yi", 10.0));
        let once = select_reference(&input);
        assert_eq!(select_reference(&once), once);
    }

    #[test]
    fn test_empty_input() {
        assert!(select_reference(&[]).is_empty());
        assert_eq!(missing_reference_stations(&[]).len(), 8);
    }

    #[test]
    fn test_missing_stations_tolerated() {
        let input = vec![reading("Cheung Chau", 70.0), reading("Sai Kung", 65.0)];
        let missing = missing_reference_stations(&input);
        assert_eq!(missing.len(), 6);
        assert!(!missing.contains(&ReferenceStation::CheungChau));
        assert!(missing.contains(&ReferenceStation::ChekLapKok));
    }
}
