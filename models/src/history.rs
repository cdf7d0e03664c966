use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Incoming,
    Outgoing,
    Missed,
}

/// Call history record kept by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallHistoryEntry {
    pub number: String,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub timestamp: String,
    /// Seconds; missed calls report 0.
    #[serde(default)]
    pub duration: u64,
}

/// Filter accepted by `get_call_history`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFilter {
    #[default]
    All,
    Incoming,
    Outgoing,
    Missed,
}

impl HistoryFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Some(HistoryFilter::All),
            "incoming" => Some(HistoryFilter::Incoming),
            "outgoing" => Some(HistoryFilter::Outgoing),
            "missed" => Some(HistoryFilter::Missed),
            _ => None,
        }
    }
}
