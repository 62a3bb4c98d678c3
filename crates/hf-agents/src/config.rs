//! Serializable building blocks of agent configuration.

use hf_bus::Topic;
use hf_controls::HysteresisBand;
use serde::{Deserialize, Serialize};

/// Where a local controller gets its setpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "from")]
pub enum SetpointSource {
    /// Fixed setpoint for the whole run.
    Constant { value: f64 },
    /// Follow commands on a topic, holding `initial` until the first arrives.
    Topic {
        topic: Topic,
        #[serde(default)]
        initial: Option<f64>,
    },
}

impl SetpointSource {
    pub fn topic(&self) -> Option<&Topic> {
        match self {
            SetpointSource::Constant { .. } => None,
            SetpointSource::Topic { topic, .. } => Some(topic),
        }
    }

    pub fn initial(&self) -> Option<f64> {
        match *self {
            SetpointSource::Constant { value } => Some(value),
            SetpointSource::Topic { initial, .. } => initial,
        }
    }
}

/// Where a local controller reads its process variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "from")]
pub enum PvSource {
    /// A key of the newest message on a topic (usually a twin's snapshot).
    Topic { topic: Topic, key: String },
    /// A component state value read directly.
    Component { component: String, key: String },
}

impl PvSource {
    pub fn topic(&self) -> Option<&Topic> {
        match self {
            PvSource::Topic { topic, .. } => Some(topic),
            PvSource::Component { .. } => None,
        }
    }
}

/// Component input a local controller drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorTarget {
    pub component: String,
    pub input: String,
}

/// One supervision rule of a central dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRule {
    pub watch_topic: Topic,
    pub observation_key: String,
    #[serde(flatten)]
    pub band: HysteresisBand,
    pub command_topic: Topic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_reads_flat_band_fields() {
        let json = r#"{
            "watch_topic": "state/reservoir_1",
            "observation_key": "water_level",
            "low_level": 8.0,
            "high_level": 10.0,
            "low_setpoint": 0.2,
            "high_setpoint": 0.8,
            "command_topic": "command/reservoir_1/level"
        }"#;
        let rule: DispatchRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.band.high_setpoint, 0.8);
        assert_eq!(rule.command_topic.as_str(), "command/reservoir_1/level");
    }

    #[test]
    fn malformed_topic_rejected_on_load() {
        let json = r#"{"from": "Topic", "topic": "bad//topic"}"#;
        assert!(serde_json::from_str::<SetpointSource>(json).is_err());
    }

    #[test]
    fn setpoint_initial() {
        assert_eq!(SetpointSource::Constant { value: 4.0 }.initial(), Some(4.0));
        let src: SetpointSource = serde_json::from_str(r#"{"from": "Topic", "topic": "cmd"}"#).unwrap();
        assert_eq!(src.initial(), None);
    }
}
