//! Patient record status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    /// Under active care.
    Active,
    /// Discharged from care.
    Discharged,
    /// Superseded by another record after identity resolution.
    Merged,
    /// Deceased.
    Deceased,
}

impl PatientStatus {
    /// Check if the record still accepts new encounters.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Active | Self::Discharged)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Discharged => "discharged",
            Self::Merged => "merged",
            Self::Deceased => "deceased",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = carescope_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "discharged" => Ok(Self::Discharged),
            "merged" => Ok(Self::Merged),
            "deceased" => Ok(Self::Deceased),
            _ => Err(carescope_core::AppError::validation(format!(
                "Invalid patient status: '{s}'. Expected one of: active, discharged, merged, deceased"
            ))),
        }
    }
}

impl TryFrom<String> for PatientStatus {
    type Error = carescope_core::AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
