//! Comparison of the computed signal against the official one.
//!
//! Disagreement is an expected outcome: the Observatory may hoist No.8 ahead
//! of the wind criteria on forecast trend, or keep it up while the 10-minute
//! means drop back.

use common::{OfficialWarning, ReconciliationResult, Signal, SignalClassification};

/// Agreement is judged on No.8 alone: computed No.8 against any TC8 code.
pub fn reconcile(
    classification: SignalClassification,
    official: OfficialWarning,
) -> ReconciliationResult {
    let agrees = (classification.signal == Signal::No8) == official.is_no8();
    ReconciliationResult {
        computed: classification,
        official,
        agrees,
    }
}
