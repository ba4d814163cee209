//! Encounter kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The setting in which a patient was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterKind {
    /// Admitted stay.
    Inpatient,
    /// Scheduled visit without admission.
    Outpatient,
    /// Emergency department visit.
    Emergency,
}

impl EncounterKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inpatient => "inpatient",
            Self::Outpatient => "outpatient",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for EncounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EncounterKind {
    type Err = carescope_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inpatient" => Ok(Self::Inpatient),
            "outpatient" => Ok(Self::Outpatient),
            "emergency" => Ok(Self::Emergency),
            _ => Err(carescope_core::AppError::validation(format!(
                "Invalid encounter kind: '{s}'. Expected one of: inpatient, outpatient, emergency"
            ))),
        }
    }
}

impl TryFrom<String> for EncounterKind {
    type Error = carescope_core::AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
