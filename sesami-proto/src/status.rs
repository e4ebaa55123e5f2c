//! Typed views over status and history bodies
//!
//! The operations hand back raw bodies; these types are for callers that
//! want fields instead of text. Every field is optional so a body with
//! missing or extra keys still parses.

use data_encoding::BASE64;
use serde::{Deserialize, Serialize};

/// Lock position as reported by `CHSesame2Status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    Locked,
    Unlocked,
    Moved,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockState::Locked => write!(f, "locked"),
            LockState::Unlocked => write!(f, "unlocked"),
            LockState::Moved => write!(f, "moved"),
            LockState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Body of `GET /api/sesame2/{device_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockStatus {
    #[serde(rename = "batteryPercentage", default)]
    pub battery_percentage: Option<u8>,
    #[serde(rename = "batteryVoltage", default)]
    pub battery_voltage: Option<f64>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(rename = "CHSesame2Status", default)]
    pub state: Option<LockState>,
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(rename = "wm2State", default)]
    pub wifi_module_online: Option<bool>,
}

impl LockStatus {
    pub fn from_body(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// One line summary, e.g. `locked, battery 94%, position 11`
    pub fn summary(&self) -> String {
        let mut parts = vec![self.state.unwrap_or(LockState::Unknown).to_string()];
        if let Some(p) = self.battery_percentage {
            parts.push(format!("battery {p}%"));
        }
        if let Some(p) = self.position {
            parts.push(format!("position {p}"));
        }
        if self.wifi_module_online == Some(false) {
            parts.push("wifi module offline".to_string());
        }
        parts.join(", ")
    }
}

/// One item of `GET /api/sesame2/{device_id}/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type", default)]
    pub kind: Option<i64>,
    #[serde(rename = "timeStamp", default)]
    pub timestamp: Option<u64>,
    #[serde(rename = "historyTag", default)]
    pub history_tag: Option<String>,
    #[serde(rename = "devicePk", default)]
    pub device_pk: Option<String>,
    #[serde(default)]
    pub parameter: Option<serde_json::Value>,
}

impl HistoryEntry {
    pub fn list_from_body(body: &str) -> serde_json::Result<Vec<Self>> {
        serde_json::from_str(body)
    }

    /// The label this entry was recorded with. History tags travel as Base64;
    /// a tag that does not decode is returned as is.
    pub fn label(&self) -> Option<String> {
        let tag = self.history_tag.as_deref()?;
        match BASE64.decode(tag.as_bytes()) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(_) => Some(tag.to_string()),
        }
    }
}
