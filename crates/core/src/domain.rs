//! The two document domains a question can be routed to.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Finance,
    Medicaid,
    /// Neither domain matched
    Unknown,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Finance => "finance",
            Domain::Medicaid => "medicaid",
            Domain::Unknown => "unknown",
        }
    }

    /// Interpret a free-text classifier reply.
    ///
    /// The reply is lowercased and trimmed; "finance" anywhere wins over
    /// "medicaid" anywhere, and anything else is `Unknown`.
    pub fn from_reply(reply: &str) -> Self {
        let reply = reply.trim().to_lowercase();
        if reply.contains("finance") {
            Domain::Finance
        } else if reply.contains("medicaid") {
            Domain::Medicaid
        } else {
            Domain::Unknown
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
