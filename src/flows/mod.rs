//! Acceptance scenarios
//!
//! Step identifiers carry the `E2E-ARC-n` acceptance-criteria tags so a
//! report line traces back to the requirement it verifies.

mod payment_notices;
mod receipts;

use crate::scenario::Scenario;

/// All registered scenarios, in suite order
pub fn all() -> Vec<Scenario> {
    vec![payment_notices::scenario(), receipts::scenario()]
}

/// Scenarios whose name or step tags match `filter` (case-insensitive)
pub fn matching(filter: &str) -> Vec<Scenario> {
    let needle = filter.to_lowercase();
    all()
        .into_iter()
        .filter(|scenario| {
            scenario.name.to_lowercase().contains(&needle)
                || scenario
                    .steps
                    .iter()
                    .any(|step| step.tag.to_lowercase().contains(&needle))
        })
        .collect()
}
