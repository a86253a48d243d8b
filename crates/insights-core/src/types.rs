use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One recorded voice-agent call session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub agent: String,
    /// Epoch-like timestamp; the unit is whatever the source uses, consistently.
    pub start_time: i64,
    /// Seconds.
    pub duration: f64,
    pub cost: f64,
    pub status: CallStatus,
    pub call_info: CallInfo,
}

impl Conversation {
    pub fn call_type(&self) -> CallType {
        self.call_info.call_type
    }

    pub fn stats(&self) -> Option<&CallStats> {
        self.call_info.stats.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallInfo {
    pub caller: String,
    pub callee: String,
    #[serde(rename = "type")]
    pub call_type: CallType,
    /// Absent when quality-of-service stats were not measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CallStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStats {
    /// Milliseconds.
    pub llm_latency: f64,
    /// Milliseconds.
    pub tts_latency: f64,
    pub interruptions: u32,
}

/// Call outcome. Declaration order is the breakdown order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Busy,
    Success,
    Transfer,
    NoAnswer,
    Dropped,
}

impl CallStatus {
    pub const ALL: [CallStatus; 5] = [
        CallStatus::Busy,
        CallStatus::Success,
        CallStatus::Transfer,
        CallStatus::NoAnswer,
        CallStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Busy => "busy",
            CallStatus::Success => "success",
            CallStatus::Transfer => "transfer",
            CallStatus::NoAnswer => "no_answer",
            CallStatus::Dropped => "dropped",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CallStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown status '{}' (expected busy, success, transfer, no_answer or dropped)",
                    s
                )
            })
    }
}

/// Call direction. Declaration order is the breakdown order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Inbound,
    Outbound,
}

impl CallType {
    pub const ALL: [CallType; 2] = [CallType::Inbound, CallType::Outbound];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Inbound => "inbound",
            CallType::Outbound => "outbound",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CallType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(CallType::Inbound),
            "outbound" => Ok(CallType::Outbound),
            other => Err(format!(
                "unknown call type '{}' (expected inbound or outbound)",
                other
            )),
        }
    }
}
