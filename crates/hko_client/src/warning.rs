//! Parser for the warning-detail JSON feed.
//!
//! The feed lists every active weather warning as a `details` record. The
//! tropical cyclone signal, when one is hoisted, appears as a record with the
//! `WTCSGNL` statement code and a subtype naming the signal.

use chrono::{DateTime, FixedOffset};
use common::{Error, OfficialWarning, CANCEL_CODE};
use serde::Deserialize;
use tracing::{debug, warn};

/// Statement code identifying tropical cyclone signal records.
pub const TC_SIGNAL_STATEMENT_CODE: &str = "WTCSGNL";

/// Warning-info response. The feed returns `{}` when nothing is in force.
#[derive(Debug, Default, Deserialize)]
pub struct WarningInfoResponse {
    #[serde(default)]
    pub details: Vec<WarningDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WarningDetail {
    #[serde(rename = "warningStatementCode", default)]
    pub warning_statement_code: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(rename = "updateTime", default)]
    pub update_time: Option<String>,
    #[serde(default)]
    pub contents: Vec<String>,
}

impl WarningDetail {
    fn is_tc_signal(&self) -> bool {
        self.warning_statement_code.as_deref() == Some(TC_SIGNAL_STATEMENT_CODE)
    }

    fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        self.update_time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
    }
}

/// Closed set of tropical cyclone signal subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TcSignal {
    Standby1,
    StrongWind3,
    GaleNortheast8,
    GaleSoutheast8,
    GaleNorthwest8,
    GaleSouthwest8,
    IncreasingGale9,
    Hurricane10,
    Cancel,
}

impl TcSignal {
    pub const ALL: [TcSignal; 9] = [
        TcSignal::Standby1,
        TcSignal::StrongWind3,
        TcSignal::GaleNortheast8,
        TcSignal::GaleSoutheast8,
        TcSignal::GaleNorthwest8,
        TcSignal::GaleSouthwest8,
        TcSignal::IncreasingGale9,
        TcSignal::Hurricane10,
        TcSignal::Cancel,
    ];

    pub fn code(self) -> &'static str {
        match self {
            TcSignal::Standby1 => "TC1",
            TcSignal::StrongWind3 => "TC3",
            TcSignal::GaleNortheast8 => "TC8NE",
            TcSignal::GaleSoutheast8 => "TC8SE",
            TcSignal::GaleNorthwest8 => "TC8NW",
            TcSignal::GaleSouthwest8 => "TC8SW",
            TcSignal::IncreasingGale9 => "TC9",
            TcSignal::Hurricane10 => "TC10",
            TcSignal::Cancel => CANCEL_CODE,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TcSignal::Standby1 => "Standby Signal No.1",
            TcSignal::StrongWind3 => "Strong Wind Signal No.3",
            TcSignal::GaleNortheast8 => "No.8 Northeast Gale or Storm Signal",
            TcSignal::GaleSoutheast8 => "No.8 Southeast Gale or Storm Signal",
            TcSignal::GaleNorthwest8 => "No.8 Northwest Gale or Storm Signal",
            TcSignal::GaleSouthwest8 => "No.8 Southwest Gale or Storm Signal",
            TcSignal::IncreasingGale9 => "Increasing Gale or Storm Signal No.9",
            TcSignal::Hurricane10 => "Hurricane Signal No.10",
            TcSignal::Cancel => "No Tropical Cyclone Signal in force",
        }
    }

    pub fn from_code(code: &str) -> Option<TcSignal> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn to_official(self) -> OfficialWarning {
        OfficialWarning::new(self.code(), self.display_name())
    }
}

/// Decode a warning feed body and resolve the signal in force.
pub fn parse_warning_feed(body: &str) -> Result<OfficialWarning, Error> {
    let feed: WarningInfoResponse = serde_json::from_str(body)?;
    debug!("Warning feed carries {} detail records", feed.details.len());
    Ok(select_official_signal(&feed))
}

/// Pick the most recent tropical cyclone record and map its subtype.
///
/// Records without a parseable `updateTime` rank below timestamped ones;
/// ties keep feed order. No record, a missing subtype, or an unknown subtype
/// all resolve to `CANCEL`.
pub fn select_official_signal(feed: &WarningInfoResponse) -> OfficialWarning {
    let mut latest: Option<&WarningDetail> = None;
    for detail in feed.details.iter().filter(|d| d.is_tc_signal()) {
        match latest {
            Some(current) if detail.updated_at() <= current.updated_at() => {}
            _ => latest = Some(detail),
        }
    }

    let Some(detail) = latest else {
        debug!("No tropical cyclone signal record in warning feed");
        return TcSignal::Cancel.to_official();
    };

    match detail.subtype.as_deref().map(str::trim) {
        Some(code) => match TcSignal::from_code(code) {
            Some(signal) => signal.to_official(),
            None => {
                warn!("Unknown tropical cyclone subtype {:?}; treating as no signal", code);
                TcSignal::Cancel.to_official()
            }
        },
        None => {
            warn!("Tropical cyclone record without subtype; treating as no signal");
            TcSignal::Cancel.to_official()
        }
    }
}
