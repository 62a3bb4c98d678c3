//! Content hashes for scenarios and recorded trajectories.

use hf_project::ScenarioDef;
use hf_sim::SimRecord;
use sha2::{Digest, Sha256};

/// Hash of a scenario's canonical JSON form.
pub fn scenario_hash(scenario: &ScenarioDef) -> String {
    let mut hasher = Sha256::new();
    let json = serde_json::to_string(scenario).unwrap_or_default();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Bit-exact fingerprint of a recorded trajectory.
///
/// Two runs have the same digest only if every recorded tick, time and state
/// value matches bit for bit, so `-0.0` and `0.0` differ.
pub fn trajectory_digest(record: &SimRecord) -> String {
    let mut hasher = Sha256::new();
    for component in &record.components {
        hasher.update(component.id.as_bytes());
        hasher.update([0u8]);
        for key in &component.keys {
            hasher.update(key.as_bytes());
            hasher.update([0u8]);
        }
    }
    for ((tick, t), row) in record.ticks.iter().zip(&record.t).zip(&record.x) {
        hasher.update(tick.to_le_bytes());
        hasher.update(t.to_bits().to_le_bytes());
        for value in row {
            hasher.update(value.to_bits().to_le_bytes());
        }
    }
    format!("{:x}", hasher.finalize())
}
