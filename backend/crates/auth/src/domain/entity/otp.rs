//! OTP Entity
//!
//! A pending one-time challenge bound to a user.

use chrono::{DateTime, Utc};
use kernel::id::Id;

use crate::domain::value_object::user_id::UserId;

pub struct OtpMarker;

/// Store-assigned OTP row identifier (`otp.id`)
pub type OtpId = Id<OtpMarker>;

/// Longest code the `otp` column holds
pub const OTP_MAX_LENGTH: usize = 16;

#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub otp_id: OtpId,
    pub user_id: UserId,
    pub code: String,
    /// Absolute expiry; the code is dead at and after this instant
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
}

impl OtpRecord {
    /// Unverified and not yet expired
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.verified && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_live() {
        let now = Utc::now();
        let mut otp = OtpRecord {
            otp_id: OtpId::from_raw(1),
            user_id: UserId::from_raw(1),
            code: "123456".into(),
            expires_at: now + Duration::minutes(1),
            verified: false,
        };

        assert!(otp.is_live(now));
        assert!(!otp.is_live(otp.expires_at));
        assert!(!otp.is_live(now + Duration::minutes(2)));

        otp.verified = true;
        assert!(!otp.is_live(now));
    }
}
