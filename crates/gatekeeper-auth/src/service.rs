//! Token lifecycle service: login, access verification, refresh, logout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info};

use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_entity::{User, UserStore};

use crate::password::PasswordHasher;
use crate::revocation::RevocationStore;
use crate::token::{Claims, TokenCodec, TokenPair, TokenType};

/// Uniform message for failed logins; does not reveal whether the email exists.
const BAD_CREDENTIALS: &str = "Incorrect email or password";

/// Issues, verifies, refreshes, and revokes token pairs.
#[derive(Debug, Clone)]
pub struct TokenService {
    /// JWT signing and verification.
    codec: TokenCodec,
    /// Refresh token revocation list.
    revocation: RevocationStore,
    /// User store for credential and principal checks.
    users: Arc<dyn UserStore>,
    /// Password hashing and verification.
    hasher: PasswordHasher,
    /// Bounded time allowed for each user lookup.
    lookup_timeout: Duration,
}

impl TokenService {
    /// Create a new token service.
    pub fn new(
        codec: TokenCodec,
        revocation: RevocationStore,
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            codec,
            revocation,
            users,
            hasher,
            lookup_timeout,
        }
    }

    /// Authenticate with email and password, issuing a fresh token pair.
    ///
    /// The failure message is identical for an unknown email and a wrong
    /// password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(User, TokenPair)> {
        let user = self
            .lookup_user(self.users.find_by_email(email))
            .await?
            .ok_or_else(|| AppError::unauthorized(BAD_CREDENTIALS))?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.id, "Login rejected: bad password");
            return Err(AppError::unauthorized(BAD_CREDENTIALS));
        }

        let pair = self.codec.issue_pair(user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok((user, pair))
    }

    /// Verify an access token and return its claims.
    ///
    /// Access tokens are verified statelessly; only refresh tokens go
    /// through the revocation list.
    pub fn verify_access(&self, token: &str) -> AppResult<Claims> {
        Ok(self.codec.verify(token, TokenType::Access)?)
    }

    /// Exchange a refresh token for a new token pair, revoking the token
    /// that was presented.
    ///
    /// The checks run in a fixed order: signature and expiry, then the
    /// revocation list, then principal existence. A revocation-store
    /// failure denies the refresh rather than letting it through.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(User, TokenPair)> {
        let claims = self.codec.verify(refresh_token, TokenType::Refresh)?;

        let revoked = self
            .revocation
            .is_revoked(refresh_token)
            .await
            .map_err(|e| {
                error!(error = %e, "Revocation check failed; denying refresh");
                AppError::unauthorized("Unable to verify token")
            })?;
        if revoked {
            return Err(AppError::unauthorized("Token has been revoked"));
        }

        let user = self
            .lookup_user(self.users.find_by_id(claims.sub))
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        // Rotate: the presented token is retired before the new pair is handed out.
        if let Err(e) = self.revocation.revoke(refresh_token, &claims).await {
            error!(error = %e, "Failed to revoke refresh token; denying refresh");
            return Err(AppError::unauthorized("Unable to verify token"));
        }

        let pair = self.codec.issue_pair(user.id)?;
        debug!(user_id = %user.id, "Refresh token rotated");
        Ok((user, pair))
    }

    /// Revoke a refresh token. Logout with an invalid or already-expired
    /// token succeeds; there is nothing left to revoke.
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        match self.codec.verify(refresh_token, TokenType::Refresh) {
            Ok(claims) => {
                if let Err(e) = self.revocation.revoke(refresh_token, &claims).await {
                    error!(error = %e, "Failed to revoke refresh token on logout");
                    return Err(AppError::unauthorized("Unable to verify token"));
                }
                info!(user_id = %claims.sub, "Refresh token revoked on logout");
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }

    /// Run a user lookup under the configured timeout.
    ///
    /// A store failure or timeout on the verification path is logged and
    /// reported as an authentication failure, never as an outage the
    /// caller could distinguish.
    async fn lookup_user<F>(&self, lookup: F) -> AppResult<Option<User>>
    where
        F: Future<Output = AppResult<Option<User>>>,
    {
        match timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(found)) => Ok(found),
            Ok(Err(e)) => {
                error!(error = %e, "User lookup failed on the verification path");
                Err(AppError::unauthorized("Unable to verify credentials"))
            }
            Err(_) => {
                error!("User lookup timed out on the verification path");
                Err(AppError::unauthorized("Unable to verify credentials"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use gatekeeper_cache::memory::MemoryCacheProvider;
    use gatekeeper_cache::CacheManager;
    use gatekeeper_core::config::cache::MemoryCacheConfig;
    use gatekeeper_core::config::AuthConfig;
    use gatekeeper_core::error::ErrorKind;
    use gatekeeper_core::types::{PageRequest, PageResponse};
    use gatekeeper_entity::user::{CreateUser, UpdateUser};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Debug, Default)]
    struct FixedUserStore {
        users: Mutex<HashMap<Uuid, User>>,
        unavailable: std::sync::atomic::AtomicBool,
    }

    impl FixedUserStore {
        fn with_user(self, user: User) -> Self {
            self.users.lock().unwrap().insert(user.id, user);
            self
        }

        fn remove(&self, id: Uuid) {
            self.users.lock().unwrap().remove(&id);
        }

        fn set_unavailable(&self, unavailable: bool) {
            self.unavailable
                .store(unavailable, std::sync::atomic::Ordering::SeqCst);
        }

        fn check_available(&self) -> AppResult<()> {
            if self.unavailable.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(AppError::database("user store offline"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserStore for FixedUserStore {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
            self.check_available()?;
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
            self.check_available()?;
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        async fn find_all(&self, page: PageRequest) -> AppResult<PageResponse<User>> {
            let users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
            let total = users.len() as u64;
            Ok(PageResponse::new(users, page.page, page.page_size, total))
        }

        async fn create(&self, _data: CreateUser) -> AppResult<User> {
            unimplemented!("not exercised")
        }

        async fn update(&self, _id: Uuid, _data: UpdateUser) -> AppResult<User> {
            unimplemented!("not exercised")
        }

        async fn delete(&self, _id: Uuid) -> AppResult<()> {
            unimplemented!("not exercised")
        }

        async fn assign_role(&self, _user_id: Uuid, _role_id: Uuid) -> AppResult<User> {
            unimplemented!("not exercised")
        }

        async fn unassign_role(&self, _user_id: Uuid, _role_id: Uuid) -> AppResult<User> {
            unimplemented!("not exercised")
        }
    }

    fn make_user(hasher: &PasswordHasher, email: &str, password: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Test User".to_string(),
            password_hash: hasher.hash_password(password).unwrap(),
            role_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_service(store: Arc<FixedUserStore>) -> TokenService {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            ..AuthConfig::default()
        };
        let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
            &MemoryCacheConfig { max_capacity: 1000 },
        )));
        let timeout = Duration::from_secs(3);
        TokenService::new(
            TokenCodec::new(&config),
            RevocationStore::new(Arc::new(cache), timeout),
            store,
            PasswordHasher::new(),
            timeout,
        )
    }

    #[tokio::test]
    async fn test_login_success() {
        let hasher = PasswordHasher::new();
        let user = make_user(&hasher, "alice@example.com", "correct horse");
        let service = make_service(Arc::new(FixedUserStore::default().with_user(user.clone())));

        let (logged_in, pair) = service.login("alice@example.com", "correct horse").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        let claims = service.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let hasher = PasswordHasher::new();
        let user = make_user(&hasher, "alice@example.com", "correct horse");
        let service = make_service(Arc::new(FixedUserStore::default().with_user(user)));

        let unknown = service
            .login("nobody@example.com", "whatever")
            .await
            .unwrap_err();
        let wrong_pw = service
            .login("alice@example.com", "wrong")
            .await
            .unwrap_err();

        assert_eq!(unknown.kind, ErrorKind::Unauthorized);
        assert_eq!(wrong_pw.kind, ErrorKind::Unauthorized);
        assert_eq!(unknown.message, wrong_pw.message);
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_revokes() {
        let hasher = PasswordHasher::new();
        let user = make_user(&hasher, "alice@example.com", "pw");
        let service = make_service(Arc::new(FixedUserStore::default().with_user(user)));

        let (_, pair) = service.login("alice@example.com", "pw").await.unwrap();
        let (_, new_pair) = service.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(new_pair.refresh_token, pair.refresh_token);

        // The consumed refresh token can not be used a second time.
        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);

        // The rotated token still works.
        service.refresh(&new_pair.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_with_access_token_rejected() {
        let hasher = PasswordHasher::new();
        let user = make_user(&hasher, "alice@example.com", "pw");
        let service = make_service(Arc::new(FixedUserStore::default().with_user(user)));

        let (_, pair) = service.login("alice@example.com", "pw").await.unwrap();
        let err = service.refresh(&pair.access_token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user_rejected() {
        let hasher = PasswordHasher::new();
        let user = make_user(&hasher, "alice@example.com", "pw");
        let user_id = user.id;
        let store = Arc::new(FixedUserStore::default().with_user(user));
        let service = make_service(store.clone());

        let (_, pair) = service.login("alice@example.com", "pw").await.unwrap();
        store.remove(user_id);

        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_logout_revokes_refresh_token() {
        let hasher = PasswordHasher::new();
        let user = make_user(&hasher, "alice@example.com", "pw");
        let service = make_service(Arc::new(FixedUserStore::default().with_user(user)));

        let (_, pair) = service.login("alice@example.com", "pw").await.unwrap();
        service.logout(&pair.refresh_token).await.unwrap();

        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_store_outage_denies_as_unauthorized() {
        let hasher = PasswordHasher::new();
        let user = make_user(&hasher, "alice@example.com", "pw");
        let store = Arc::new(FixedUserStore::default().with_user(user));
        let service = make_service(store.clone());

        let (_, pair) = service.login("alice@example.com", "pw").await.unwrap();
        store.set_unavailable(true);

        // The outage class never reaches the caller.
        let login_err = service
            .login("alice@example.com", "pw")
            .await
            .unwrap_err();
        assert_eq!(login_err.kind, ErrorKind::Unauthorized);

        let refresh_err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert_eq!(refresh_err.kind, ErrorKind::Unauthorized);

        // Back online, the untouched refresh token still works.
        store.set_unavailable(false);
        service.refresh(&pair.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_is_idempotent_and_lenient() {
        let hasher = PasswordHasher::new();
        let user = make_user(&hasher, "alice@example.com", "pw");
        let service = make_service(Arc::new(FixedUserStore::default().with_user(user)));

        let (_, pair) = service.login("alice@example.com", "pw").await.unwrap();
        service.logout(&pair.refresh_token).await.unwrap();
        service.logout(&pair.refresh_token).await.unwrap();
        // Garbage tokens do not error either.
        service.logout("garbage").await.unwrap();
    }
}
