// ── Problem severity ──

use serde::{Deserialize, Serialize};

/// Severity classification of a problem.
///
/// The wire carries severity as a numeric string `"0"`–`"5"`; anything
/// outside that range maps to [`Severity::Unknown`] so display code
/// never has to handle an out-of-band value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    NotClassified,
    Information,
    Warning,
    Average,
    High,
    Disaster,
    Unknown,
}

impl Severity {
    /// Decode a wire severity code. Total: never fails.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => Self::NotClassified,
            "1" => Self::Information,
            "2" => Self::Warning,
            "3" => Self::Average,
            "4" => Self::High,
            "5" => Self::Disaster,
            _ => Self::Unknown,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NotClassified => "Not classified",
            Self::Information => "Information",
            Self::Warning => "Warning",
            Self::Average => "Average",
            Self::High => "High",
            Self::Disaster => "Disaster",
            Self::Unknown => "Unknown",
        }
    }

    /// Presentation color as `#RRGGBB` hex.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Information => "#66CCFF",
            Self::Warning => "#FFCC66",
            Self::Average => "#FF9966",
            Self::High => "#CC6633",
            Self::Disaster => "#CC0000",
            Self::NotClassified | Self::Unknown => "#888888",
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
