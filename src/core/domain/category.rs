//! The closed OddsAxiom category taxonomy.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Politics,
    Economics,
    Crypto,
    Science,
    Culture,
    Sports,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Politics => "politics",
            Self::Economics => "economics",
            Self::Crypto => "crypto",
            Self::Science => "science",
            Self::Culture => "culture",
            Self::Sports => "sports",
        }
    }

    /// Parse a venue-native category string, case-insensitively. Returns
    /// `None` for anything not in the closed taxonomy so callers can fall
    /// back to keyword matching.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "politics" => Some(Self::Politics),
            "economics" => Some(Self::Economics),
            "crypto" => Some(Self::Crypto),
            "science" => Some(Self::Science),
            "culture" => Some(Self::Culture),
            "sports" => Some(Self::Sports),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
