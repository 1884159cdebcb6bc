mod common;

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use task_api::auth::{
    authorize, AuthError, AuthService, DuplicateField, PasswordHasher, TokenError, TokenIssuer,
};
use task_api::models::{NewUser, NewUserRecord, Role, UserRecord, UserUpdate};
use task_api::repository::{MemoryUserStore, StoreError, UserStore};

use common::SECRET;

fn tokens() -> Arc<TokenIssuer> {
    Arc::new(TokenIssuer::new(SECRET.as_bytes(), chrono::Duration::hours(24)))
}

fn service(users: Arc<dyn UserStore>) -> AuthService {
    AuthService::new(users, PasswordHasher::new(4).unwrap(), tokens()).unwrap()
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        full_name: String::new(),
        role: Role::User,
    }
}

/// Answers every lookup with "not found", so only the store's own uniqueness
/// check stands between two registrations of the same name.
struct BlindUserStore(MemoryUserStore);

#[async_trait]
impl UserStore for BlindUserStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<UserRecord>, StoreError> {
        self.0.find_by_id(id).await
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(None)
    }

    async fn create(&self, user: NewUserRecord) -> Result<UserRecord, StoreError> {
        self.0.create(user).await
    }

    async fn update(&self, id: i32, changes: &UserUpdate) -> Result<UserRecord, StoreError> {
        self.0.update(id, changes).await
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        self.0.delete(id).await
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<UserRecord>, StoreError> {
        self.0.list(offset, limit).await
    }
}

/// A store whose backend is gone.
struct DownUserStore;

#[async_trait]
impl UserStore for DownUserStore {
    async fn find_by_id(&self, _id: i32) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn create(&self, _user: NewUserRecord) -> Result<UserRecord, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn update(&self, _id: i32, _changes: &UserUpdate) -> Result<UserRecord, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _id: i32) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn list(&self, _offset: i64, _limit: i64) -> Result<Vec<UserRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[actix_rt::test]
async fn test_register_login_authorize() {
    let users = Arc::new(MemoryUserStore::new());
    let auth = service(users.clone());

    let alice = auth.register(new_user("alice", "alice@x.com")).await.unwrap();
    assert_eq!(alice.username, "alice");
    assert_eq!(alice.role, Role::User);
    assert!(alice.is_active);

    let stored = users.find_by_id(alice.id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "password123");
    assert!(PasswordHasher::new(4)
        .unwrap()
        .verify("password123", &stored.password_hash));

    let (user, token) = auth.login("alice", "password123").await.unwrap();
    assert_eq!(user, alice);

    let identity = authorize(auth.tokens(), &format!("Bearer {}", token)).unwrap();
    assert_eq!(identity.user_id, alice.id);
    assert_eq!(identity.role, Role::User);
}

#[actix_rt::test]
async fn test_duplicate_registrations() {
    let auth = service(Arc::new(MemoryUserStore::new()));
    auth.register(new_user("alice", "alice@x.com")).await.unwrap();

    let err = auth
        .register(new_user("alice", "other@x.com"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::DuplicateIdentity(DuplicateField::Username));

    let err = auth
        .register(new_user("alice2", "alice@x.com"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::DuplicateIdentity(DuplicateField::Email));
}

#[actix_rt::test]
async fn test_store_constraint_decides_duplicates() {
    let auth = service(Arc::new(BlindUserStore(MemoryUserStore::new())));
    auth.register(new_user("alice", "alice@x.com")).await.unwrap();

    let err = auth
        .register(new_user("alice", "other@x.com"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::DuplicateIdentity(DuplicateField::Username));
}

#[actix_rt::test]
async fn test_concurrent_registrations_admit_one() {
    let users = Arc::new(BlindUserStore(MemoryUserStore::new()));
    let auth = Arc::new(service(users.clone()));

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let auth = Arc::clone(&auth);
            actix_rt::spawn(async move {
                auth.register(new_user("racer", &format!("racer{}@x.com", i)))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for attempt in futures::future::join_all(attempts).await {
        match attempt.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e, AuthError::DuplicateIdentity(DuplicateField::Username)),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(users.list(0, 100).await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_login_rejections() {
    let users = Arc::new(MemoryUserStore::new());
    let auth = service(users.clone());
    let alice = auth.register(new_user("alice", "alice@x.com")).await.unwrap();

    assert_eq!(
        auth.login("alice", "wrong-password").await.unwrap_err(),
        AuthError::InvalidCredentials
    );
    assert_eq!(
        auth.login("nobody", "password123").await.unwrap_err(),
        AuthError::InvalidCredentials
    );

    users
        .update(
            alice.id,
            &UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        auth.login("alice", "password123").await.unwrap_err(),
        AuthError::InvalidCredentials
    );
}

#[actix_rt::test]
async fn test_store_outage_is_not_a_credential_failure() {
    let auth = service(Arc::new(DownUserStore));

    let err = auth.login("alice", "password123").await.unwrap_err();
    assert!(err.is_infrastructure(), "unexpected error: {:?}", err);

    let err = auth
        .register(new_user("alice", "alice@x.com"))
        .await
        .unwrap_err();
    assert!(err.is_infrastructure(), "unexpected error: {:?}", err);
}

#[actix_rt::test]
async fn test_register_validates_input() {
    let users = Arc::new(MemoryUserStore::new());
    let auth = service(users.clone());

    let mut short_password = new_user("alice", "alice@x.com");
    short_password.password = "short".to_string();
    assert!(matches!(
        auth.register(short_password).await,
        Err(AuthError::Validation(_))
    ));

    assert!(matches!(
        auth.register(new_user("alice", "not-an-email")).await,
        Err(AuthError::Validation(_))
    ));

    assert!(users.list(0, 100).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_authorize_rejections() {
    let auth = service(Arc::new(MemoryUserStore::new()));
    let other = TokenIssuer::new(
        b"another-secret-that-is-also-32-bytes-long",
        chrono::Duration::hours(1),
    );
    let foreign = other.issue(1, Role::Admin).unwrap();

    assert_eq!(
        authorize(auth.tokens(), "").unwrap_err(),
        AuthError::MissingCredential
    );
    assert_eq!(
        authorize(auth.tokens(), "Token abc").unwrap_err(),
        AuthError::MalformedCredential
    );
    assert_eq!(
        authorize(auth.tokens(), &format!("Bearer {}", foreign)).unwrap_err(),
        AuthError::Unauthenticated(TokenError::SignatureInvalid)
    );
    assert_eq!(
        authorize(auth.tokens(), "Bearer not-a-jwt").unwrap_err(),
        AuthError::Unauthenticated(TokenError::Malformed)
    );
}
