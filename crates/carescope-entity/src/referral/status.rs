//! Referral status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a cross-hospital referral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    /// Sent, awaiting the target hospital.
    Pending,
    /// Accepted by the target hospital.
    Accepted,
    /// Declined by the target hospital.
    Rejected,
    /// Patient has been seen at the target hospital.
    Completed,
}

impl ReferralStatus {
    /// Check if the target hospital still has to act.
    pub fn awaits_response(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReferralStatus {
    type Err = carescope_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            _ => Err(carescope_core::AppError::validation(format!(
                "Invalid referral status: '{s}'. Expected one of: pending, accepted, rejected, completed"
            ))),
        }
    }
}

impl TryFrom<String> for ReferralStatus {
    type Error = carescope_core::AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
