//! Tropical cyclone signal determination.
//!
//! Classifies the reference-station wind regime as No.3, No.8 or neither,
//! and reconciles that against the Observatory's published signal.

pub mod cache;
pub mod classifier;
pub mod engine;
pub mod reconcile;
pub mod stations;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use classifier::classify;
pub use engine::{Determination, OfficialStatus, SignalEngine};
pub use reconcile::reconcile;
pub use stations::{missing_reference_stations, select_reference, ReferenceStation};
