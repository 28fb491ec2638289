//! Shared test helpers: in-memory stores and a router harness.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use chrono::Utc;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use gatekeeper_auth::{
    DefaultPermissions, PasswordHasher, PermissionResolver, RevocationStore, TokenCodec,
    TokenService,
};
use gatekeeper_cache::memory::MemoryCacheProvider;
use gatekeeper_cache::CacheManager;
use gatekeeper_core::config::cache::MemoryCacheConfig;
use gatekeeper_core::config::AppConfig;
use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::types::{PageRequest, PageResponse};
use gatekeeper_entity::role::{CreateRole, Role, UpdateRole};
use gatekeeper_entity::user::{CreateUser, UpdateUser, User};
use gatekeeper_entity::{RoleStore, UserStore};

/// In-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
    unavailable: AtomicBool,
}

impl InMemoryUsers {
    /// Make every lookup fail, simulating a store outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::database("user store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
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
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        let total = users.len() as u64;
        Ok(PageResponse::new(users, page.page, page.page_size, total))
    }

    async fn create(&self, data: CreateUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(AppError::conflict(format!(
                "Email '{}' already in use",
                data.email
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            name: data.name,
            password_hash: data.password_hash,
            role_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, data: UpdateUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        if let Some(email) = data.email {
            user.email = email;
        }
        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(hash) = data.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        if !user.role_ids.contains(&role_id) {
            user.role_ids.push(role_id);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn unassign_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        user.role_ids.retain(|id| *id != role_id);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

/// In-memory role store.
#[derive(Debug, Default)]
pub struct InMemoryRoles {
    roles: Mutex<HashMap<Uuid, Role>>,
    unavailable: AtomicBool,
}

impl InMemoryRoles {
    /// Make every lookup fail, simulating a store outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::database("role store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleStore for InMemoryRoles {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
        self.check_available()?;
        Ok(self.roles.lock().unwrap().get(&id).cloned())
    }

    async fn find_many_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>> {
        self.check_available()?;
        let roles = self.roles.lock().unwrap();
        Ok(ids.iter().filter_map(|id| roles.get(id).cloned()).collect())
    }

    async fn find_all(&self, page: PageRequest) -> AppResult<PageResponse<Role>> {
        let mut roles: Vec<Role> = self.roles.lock().unwrap().values().cloned().collect();
        roles.sort_by_key(|r| r.created_at);
        let total = roles.len() as u64;
        Ok(PageResponse::new(roles, page.page, page.page_size, total))
    }

    async fn create(&self, data: CreateRole) -> AppResult<Role> {
        let mut roles = self.roles.lock().unwrap();
        if roles.values().any(|r| r.name == data.name) {
            return Err(AppError::conflict(format!(
                "Role '{}' already exists",
                data.name
            )));
        }
        let role = Role {
            id: Uuid::new_v4(),
            name: data.name,
            permissions: data.permissions,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn update(&self, id: Uuid, data: UpdateRole) -> AppResult<Role> {
        let mut roles = self.roles.lock().unwrap();
        let role = roles
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;
        if let Some(name) = data.name {
            role.name = name;
        }
        if let Some(permissions) = data.permissions {
            role.permissions = permissions;
        }
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.roles
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))
    }
}

/// A decoded test response.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Test harness wiring the full router over in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUsers>,
    pub roles: Arc<InMemoryRoles>,
    hasher: PasswordHasher,
}

impl TestApp {
    /// Build an app whose default permission set is `users:read`.
    pub fn new() -> Self {
        Self::with_defaults(&["users:read"])
    }

    /// Build an app with an explicit default permission set.
    pub fn with_defaults(defaults: &[&str]) -> Self {
        let mut config = AppConfig::load("test").expect("config defaults");
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let users = Arc::new(InMemoryUsers::default());
        let roles = Arc::new(InMemoryRoles::default());

        let cache = Arc::new(CacheManager::from_provider(Arc::new(
            MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 }),
        )));

        let users_dyn: Arc<dyn UserStore> = users.clone();
        let roles_dyn: Arc<dyn RoleStore> = roles.clone();

        let lookup_timeout = config.auth.lookup_timeout();
        let hasher = PasswordHasher::new();
        let tokens = Arc::new(TokenService::new(
            TokenCodec::new(&config.auth),
            RevocationStore::new(Arc::clone(&cache), lookup_timeout),
            Arc::clone(&users_dyn),
            hasher.clone(),
            lookup_timeout,
        ));
        let permissions = Arc::new(PermissionResolver::new(
            Arc::clone(&roles_dyn),
            DefaultPermissions::from_list(defaults.iter().map(|p| p.to_string())),
            lookup_timeout,
        ));

        let state = gatekeeper_api::AppState {
            config: Arc::new(config),
            cache,
            tokens,
            permissions,
            password_hasher: Arc::new(hasher.clone()),
            users: users_dyn,
            roles: roles_dyn,
        };

        Self {
            router: gatekeeper_api::build_router(state),
            users,
            roles,
            hasher,
        }
    }

    /// Seed a user directly into the store.
    pub async fn seed_user(&self, email: &str, password: &str, role_ids: Vec<Uuid>) -> User {
        let mut user = self
            .users
            .create(CreateUser {
                email: email.to_string(),
                name: email.split('@').next().unwrap_or("user").to_string(),
                password_hash: self.hasher.hash_password(password).unwrap(),
            })
            .await
            .unwrap();
        for role_id in role_ids {
            user = self.users.assign_role(user.id, role_id).await.unwrap();
        }
        user
    }

    /// Seed a role directly into the store.
    pub async fn seed_role(&self, name: &str, permissions: &[&str]) -> Role {
        self.roles
            .create(CreateRole {
                name: name.to_string(),
                permissions: permissions.iter().map(|p| p.to_string()).collect(),
            })
            .await
            .unwrap()
    }

    /// Log in and return (access_token, refresh_token).
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let resp = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({"email": email, "password": password})),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login failed: {}", resp.body);
        let data = &resp.body["data"];
        (
            data["access_token"].as_str().unwrap().to_string(),
            data["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    /// Send a request through the router and decode the JSON body.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
