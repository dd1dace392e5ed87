use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three root record kinds an Arrow IPC metadata buffer can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootKind {
    Schema,
    Message,
    Footer,
}

impl RootKind {
    pub const ALL: [RootKind; 3] = [RootKind::Schema, RootKind::Message, RootKind::Footer];

    pub fn as_str(self) -> &'static str {
        match self {
            RootKind::Schema => "schema",
            RootKind::Message => "message",
            RootKind::Footer => "footer",
        }
    }

    /// Stable numeric code used across the C ABI.
    pub fn code(self) -> u32 {
        match self {
            RootKind::Schema => 0,
            RootKind::Message => 1,
            RootKind::Footer => 2,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(RootKind::Schema),
            1 => Some(RootKind::Message),
            2 => Some(RootKind::Footer),
            _ => None,
        }
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "schema" => Ok(RootKind::Schema),
            "message" => Ok(RootKind::Message),
            "footer" => Ok(RootKind::Footer),
            other => Err(format!("unknown root kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for kind in RootKind::ALL {
            assert_eq!(RootKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(RootKind::from_code(3), None);
    }

    #[test]
    fn names_roundtrip() {
        for kind in RootKind::ALL {
            assert_eq!(kind.to_string().parse::<RootKind>(), Ok(kind));
        }
        assert!("tensor".parse::<RootKind>().is_err());
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&RootKind::Footer).unwrap();
        assert_eq!(json, "\"footer\"");
    }
}
