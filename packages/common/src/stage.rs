use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Place of a template in the guest journey.
///
/// The set is closed; `Stage::ALL` is also the order stages are listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "Pre-Arrival")]
    PreArrival,
    #[serde(rename = "Check-In")]
    CheckIn,
    #[serde(rename = "Add ons")]
    AddOns,
    #[serde(rename = "Check-Out")]
    CheckOut,
    #[serde(rename = "Post-Stay")]
    PostStay,
    #[serde(rename = "General")]
    General,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::PreArrival,
        Stage::CheckIn,
        Stage::AddOns,
        Stage::CheckOut,
        Stage::PostStay,
        Stage::General,
    ];

    /// Human-readable label, identical to the serialized form
    pub fn label(self) -> &'static str {
        match self {
            Stage::PreArrival => "Pre-Arrival",
            Stage::CheckIn => "Check-In",
            Stage::AddOns => "Add ons",
            Stage::CheckOut => "Check-Out",
            Stage::PostStay => "Post-Stay",
            Stage::General => "General",
        }
    }

    /// Pick a stage by its 1-based position in `Stage::ALL`
    pub fn from_index(index: usize) -> Option<Stage> {
        index.checked_sub(1).and_then(|i| Stage::ALL.get(i).copied())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = ValidationError;

    /// Accepts a label (case-insensitive) or a 1-based index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(index) = trimmed.parse::<usize>() {
            return Stage::from_index(index)
                .ok_or_else(|| ValidationError::UnknownStage(trimmed.to_string()));
        }

        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownStage(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_and_index() {
        assert_eq!("check-in".parse::<Stage>().unwrap(), Stage::CheckIn);
        assert_eq!("Add ons".parse::<Stage>().unwrap(), Stage::AddOns);
        assert_eq!("1".parse::<Stage>().unwrap(), Stage::PreArrival);
        assert_eq!("6".parse::<Stage>().unwrap(), Stage::General);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            "0".parse::<Stage>(),
            Err(ValidationError::UnknownStage(_))
        ));
        assert!(matches!(
            "7".parse::<Stage>(),
            Err(ValidationError::UnknownStage(_))
        ));
        assert!("Checkout Later".parse::<Stage>().is_err());
    }

    #[test]
    fn test_serialized_form_is_label() {
        for stage in Stage::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.label()));
        }
    }
}
