//! Integration tests for the catalog repository layer.
//!
//! Exercises the repositories against a real SQLite database:
//! - User creation and the unique-email constraint
//! - Two-phase token creation and the owner+database-name constraint
//! - Activation state transitions
//! - Append-only audit inserts via the token-string join

use sqlx::SqlitePool;

use lattice_db::models::user::CreateUser;
use lattice_db::repositories::{TokenRepo, UseRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        full_name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "2c26b46b68ffc68ff99b453c1d304134".to_string(),
    }
}

/// Whether a sqlx error is a SQLite unique-constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("2067") | Some("1555"))
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_find_user(pool: SqlitePool) {
    let user = UserRepo::create(&pool, &new_user("alice@example.com"))
        .await
        .expect("user creation should succeed");

    assert_eq!(user.full_name, "Test User");
    assert_eq!(user.email, "alice@example.com");
    assert!(user.is_active);

    let by_id = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, user.email);

    let by_email = UserRepo::find_by_email(&pool, "alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);

    let missing = UserRepo::find_by_email(&pool, "ghost@example.com")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_email_rejected(pool: SqlitePool) {
    UserRepo::create(&pool, &new_user("alice@example.com"))
        .await
        .unwrap();

    let err = UserRepo::create(&pool, &new_user("alice@example.com"))
        .await
        .expect_err("duplicate email must be rejected");
    assert!(is_unique_violation(&err), "unexpected error: {err}");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivate_user(pool: SqlitePool) {
    let user = UserRepo::create(&pool, &new_user("alice@example.com"))
        .await
        .unwrap();

    assert!(UserRepo::deactivate(&pool, user.id).await.unwrap());
    // Second deactivation is a no-op.
    assert!(!UserRepo::deactivate(&pool, user.id).await.unwrap());

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(!reloaded.is_active);
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_token_creation_is_two_phase(pool: SqlitePool) {
    let user = UserRepo::create(&pool, &new_user("alice@example.com"))
        .await
        .unwrap();

    let token = TokenRepo::create(&pool, user.id, "shop").await.unwrap();
    assert!(token.is_pending());
    assert!(token.token.is_empty(), "credential is written in step two");
    assert!(token.activation_code.is_none());

    let expires = chrono::Utc::now() + chrono::Duration::minutes(30);
    let updated =
        TokenRepo::update_credentials(&pool, token.id, "signed.jwt.credential", "A1B2C3", expires)
            .await
            .unwrap();
    assert!(updated);

    let reloaded = TokenRepo::find_by_id(&pool, token.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.token, "signed.jwt.credential");
    assert_eq!(reloaded.activation_code.as_deref(), Some("A1B2C3"));
    assert!(reloaded.activation_code_expires_at.is_some());
    assert!(reloaded.is_pending());

    let by_token = TokenRepo::find_by_token(&pool, "signed.jwt.credential")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_token.id, token.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_database_name_per_owner_rejected(pool: SqlitePool) {
    let alice = UserRepo::create(&pool, &new_user("alice@example.com"))
        .await
        .unwrap();
    let bob = UserRepo::create(&pool, &new_user("bob@example.com"))
        .await
        .unwrap();

    TokenRepo::create(&pool, alice.id, "shop").await.unwrap();

    let err = TokenRepo::create(&pool, alice.id, "shop")
        .await
        .expect_err("same owner cannot reuse a database name");
    assert!(is_unique_violation(&err), "unexpected error: {err}");

    // A different owner may reuse the same name.
    let bobs = TokenRepo::create(&pool, bob.id, "shop").await.unwrap();
    assert_eq!(bobs.database_name, "shop");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_activation_clears_code_and_expiry(pool: SqlitePool) {
    let user = UserRepo::create(&pool, &new_user("alice@example.com"))
        .await
        .unwrap();
    let token = TokenRepo::create(&pool, user.id, "shop").await.unwrap();
    let expires = chrono::Utc::now() + chrono::Duration::minutes(30);
    TokenRepo::update_credentials(&pool, token.id, "cred", "A1B2C3", expires)
        .await
        .unwrap();

    assert!(TokenRepo::activate(&pool, token.id).await.unwrap());

    let reloaded = TokenRepo::find_by_id(&pool, token.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.is_active);
    assert!(reloaded.activation_code.is_none());
    assert!(reloaded.activation_code_expires_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_tokens_in_insertion_order(pool: SqlitePool) {
    let user = UserRepo::create(&pool, &new_user("alice@example.com"))
        .await
        .unwrap();

    for name in ["alpha", "beta", "gamma"] {
        TokenRepo::create(&pool, user.id, name).await.unwrap();
    }

    let tokens = TokenRepo::list_by_user(&pool, user.id).await.unwrap();
    let names: Vec<&str> = tokens.iter().map(|t| t.database_name.as_str()).collect();
    assert_eq!(names, ["alpha", "beta", "gamma"]);
}

// ---------------------------------------------------------------------------
// Uses
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_use_insert_resolves_token_by_credential(pool: SqlitePool) {
    let user = UserRepo::create(&pool, &new_user("alice@example.com"))
        .await
        .unwrap();
    let token = TokenRepo::create(&pool, user.id, "shop").await.unwrap();
    let expires = chrono::Utc::now() + chrono::Duration::minutes(30);
    TokenRepo::update_credentials(&pool, token.id, "cred", "A1B2C3", expires)
        .await
        .unwrap();

    let inserted = UseRepo::insert(&pool, "cred", r#"{"status":200}"#)
        .await
        .unwrap();
    assert!(inserted);

    let uses = UseRepo::list_by_token(&pool, token.id).await.unwrap();
    assert_eq!(uses.len(), 1);
    assert_eq!(uses[0].data, r#"{"status":200}"#);
    assert_eq!(UseRepo::count_by_token(&pool, token.id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_use_insert_with_unknown_credential_is_noop(pool: SqlitePool) {
    let inserted = UseRepo::insert(&pool, "no-such-credential", "{}")
        .await
        .unwrap();
    assert!(!inserted, "no token row to attach the record to");
}
