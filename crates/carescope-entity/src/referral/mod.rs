//! Referral domain entities.

pub mod model;
pub mod status;

pub use model::Referral;
pub use status::ReferralStatus;
