//! In-Memory Repository Implementation
//!
//! Same contract as the PostgreSQL store: sequential ids from 1, unique
//! user name and email, active-only login lookup, single live OTP per user.
//! Used by tests and local runs without a database.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::clock::Clock;
use tokio::sync::Mutex;

use crate::domain::entity::{
    otp::{OtpId, OtpRecord},
    user::{NewUser, User},
};
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::value_object::{user_id::UserId, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: Vec<User>,
    otps: Vec<OtpRecord>,
    next_user_id: i64,
    next_otp_id: i64,
}

impl State {
    fn user_mut(&mut self, user_id: UserId) -> AuthResult<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .ok_or(AuthError::UserNotFound)
    }

    /// Another user already holds this user name or email
    fn is_taken(&self, user: &NewUser, except: Option<UserId>) -> bool {
        self.users.iter().any(|u| {
            Some(u.user_id) != except && (u.user_name == user.user_name || u.email == user.email)
        })
    }
}

/// Mutex-guarded store; clones share state
#[derive(Clone)]
pub struct InMemoryAuthRepository {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryAuthRepository {
    /// `clock` decides OTP liveness and `date_joined`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn insert(&self, user: &NewUser, password: &UserPassword) -> AuthResult<UserId> {
        let mut state = self.state.lock().await;
        if state.is_taken(user, None) {
            return Err(AuthError::Conflict);
        }

        state.next_user_id += 1;
        let user_id = UserId::from_raw(state.next_user_id);
        let now = self.clock.now();
        state.users.push(User {
            user_id,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            password_hash: password.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            date_joined: now,
            last_login: None,
            password_changed: now,
        });

        Ok(user_id)
    }

    async fn find_by_login(&self, handle: &str) -> AuthResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.is_active && u.matches_login(handle))
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn exists(&self, user_id: UserId) -> AuthResult<bool> {
        let state = self.state.lock().await;
        Ok(state.users.iter().any(|u| u.user_id == user_id))
    }

    async fn update_last_login(&self, user_id: UserId, at: DateTime<Utc>) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        state.user_mut(user_id)?.last_login = Some(at);
        Ok(())
    }

    async fn update_password(
        &self,
        user_id: UserId,
        password: &UserPassword,
        at: DateTime<Utc>,
    ) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        let user = state.user_mut(user_id)?;
        user.password_hash = password.clone();
        user.password_changed = at;
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        let handles = NewUser::new(user.user_name.clone(), user.email.clone());
        if state.is_taken(&handles, Some(user.user_id)) {
            return Err(AuthError::Conflict);
        }

        let stored = state.user_mut(user.user_id)?;
        stored.user_name = user.user_name.clone();
        stored.email = user.email.clone();
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.is_active = user.is_active;
        stored.is_superuser = user.is_superuser;
        Ok(())
    }
}

impl OtpRepository for InMemoryAuthRepository {
    async fn replace_for_user(
        &self,
        user_id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<OtpId> {
        // One lock covers delete and insert
        let mut state = self.state.lock().await;
        if !state.users.iter().any(|u| u.user_id == user_id) {
            return Err(AuthError::UserNotFound);
        }

        state.otps.retain(|otp| otp.user_id != user_id);
        state.next_otp_id += 1;
        let otp_id = OtpId::from_raw(state.next_otp_id);
        state.otps.push(OtpRecord {
            otp_id,
            user_id,
            code: code.to_string(),
            expires_at,
            verified: false,
        });

        Ok(otp_id)
    }

    async fn find_live(&self, user_id: UserId, code: &str) -> AuthResult<Option<OtpId>> {
        let now = self.clock.now();
        let state = self.state.lock().await;
        Ok(state
            .otps
            .iter()
            .find(|otp| otp.user_id == user_id && otp.code == code && otp.is_live(now))
            .map(|otp| otp.otp_id))
    }

    async fn mark_verified(&self, otp_id: OtpId) -> AuthResult<bool> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        match state
            .otps
            .iter_mut()
            .find(|otp| otp.otp_id == otp_id && otp.is_live(now))
        {
            Some(otp) => {
                otp.verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use kernel::clock::ManualClock;

    use crate::domain::value_object::{email::Email, user_name::UserName};

    fn repo() -> (InMemoryAuthRepository, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        (InMemoryAuthRepository::new(Arc::new(clock.clone())), clock)
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser::new(UserName::new(name).unwrap(), Email::new(email).unwrap())
    }

    fn hash() -> UserPassword {
        UserPassword::from_db("$2b$04$placeholder")
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let (repo, _) = repo();
        let id = repo.insert(&new_user("alice", "a@x"), &hash()).await.unwrap();
        assert_eq!(id, UserId::from_raw(1));

        assert!(repo.find_by_login("alice").await.unwrap().is_some());
        assert!(repo.find_by_login("A@x").await.unwrap().is_some());
        assert!(repo.find_by_login("nobody").await.unwrap().is_none());
        assert!(repo.exists(id).await.unwrap());
        assert!(!repo.exists(UserId::from_raw(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_uniqueness() {
        let (repo, _) = repo();
        repo.insert(&new_user("alice", "a@x"), &hash()).await.unwrap();

        let dup = repo.insert(&new_user("alice", "b@x"), &hash()).await;
        assert!(matches!(dup, Err(AuthError::Conflict)));
        let dup = repo.insert(&new_user("bob", "a@x"), &hash()).await;
        assert!(matches!(dup, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn test_inactive_hidden_from_login_lookup() {
        let (repo, _) = repo();
        let mut user = new_user("alice", "a@x");
        user.is_active = false;
        let id = repo.insert(&user, &hash()).await.unwrap();

        assert!(repo.find_by_login("alice").await.unwrap().is_none());
        assert!(repo.find_by_id(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_replace_keeps_single_live_otp() {
        let (repo, clock) = repo();
        let id = repo.insert(&new_user("alice", "a@x"), &hash()).await.unwrap();
        let expiry = clock.now() + Duration::minutes(5);

        repo.replace_for_user(id, "111111", expiry).await.unwrap();
        repo.replace_for_user(id, "222222", expiry).await.unwrap();

        assert!(repo.find_live(id, "111111").await.unwrap().is_none());
        let otp_id = repo.find_live(id, "222222").await.unwrap().unwrap();

        assert!(repo.mark_verified(otp_id).await.unwrap());
        assert!(!repo.mark_verified(otp_id).await.unwrap());
        assert!(repo.find_live(id, "222222").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_otp_is_not_live() {
        let (repo, clock) = repo();
        let id = repo.insert(&new_user("alice", "a@x"), &hash()).await.unwrap();
        repo.replace_for_user(id, "123456", clock.now() + Duration::minutes(1))
            .await
            .unwrap();

        clock.advance(Duration::minutes(1));
        assert!(repo.find_live(id, "123456").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_otp_for_unknown_user() {
        let (repo, clock) = repo();
        let err = repo
            .replace_for_user(UserId::from_raw(9), "123456", clock.now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }
}
