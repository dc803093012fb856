use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a user currently is in the work/break cycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Stopped,
    Working,
    OnBreak,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Stopped => "stopped",
            Status::Working => "working",
            Status::OnBreak => "on_break",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stopped" => Some(Self::Stopped),
            "working" => Some(Self::Working),
            "on_break" | "onbreak" => Some(Self::OnBreak),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Status::Stopped)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Stopped => "stopped",
            Status::Working => "working",
            Status::OnBreak => "on break",
        };
        f.write_str(label)
    }
}
