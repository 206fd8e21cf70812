//! Blocking-pool wrappers for bcrypt
//!
//! bcrypt at production cost takes tens of milliseconds of CPU, so it runs
//! on tokio's blocking pool instead of a runtime worker.

use tokio::sync::OnceCell;

use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

const DECOY_PASSWORD: &str = "decoy-password-never-issued";

pub(crate) async fn hash_password(raw: RawPassword, cost: u32) -> AuthResult<UserPassword> {
    tokio::task::spawn_blocking(move || UserPassword::from_raw(&raw, cost))
        .await
        .map_err(|e| AuthError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(AuthError::from)
}

pub(crate) async fn verify_password(hash: UserPassword, raw: RawPassword) -> AuthResult<bool> {
    tokio::task::spawn_blocking(move || hash.verify(&raw))
        .await
        .map_err(|e| AuthError::Internal(format!("password verification task failed: {e}")))
}

/// Stand-in hash for logins that matched no usable account
///
/// Verifying against it makes an unknown or inactive handle cost the same
/// bcrypt work as a wrong password. Built on first use at the configured
/// cost.
pub(crate) struct DecoyHash {
    cost: u32,
    hash: OnceCell<UserPassword>,
}

impl DecoyHash {
    pub(crate) fn new(cost: u32) -> Self {
        Self {
            cost,
            hash: OnceCell::new(),
        }
    }

    /// Spend one verification; the outcome is discarded
    pub(crate) async fn verify(&self, raw: RawPassword) -> AuthResult<()> {
        let hash = self
            .hash
            .get_or_try_init(|| async {
                let decoy = RawPassword::new(DECOY_PASSWORD.to_string())?;
                hash_password(decoy, self.cost).await
            })
            .await?;
        verify_password(hash.clone(), raw).await?;
        Ok(())
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.hash.initialized()
    }
}
