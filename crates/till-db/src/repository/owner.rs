//! # Owner Credential Repository
//!
//! Verifies the owner password that gates verify and reopen.
//!
//! Hashes are argon2 PHC strings (`$argon2id$v=19$...`). A password matches
//! if it verifies against any active owner credential.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Repository for owner credentials.
#[derive(Debug, Clone)]
pub struct OwnerRepository {
    pool: SqlitePool,
}

impl OwnerRepository {
    /// Creates a new OwnerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OwnerRepository { pool }
    }

    /// Creates an active owner credential and returns its ID.
    ///
    /// ## Errors
    /// - `UniqueViolation` if the username is taken
    pub async fn create(&self, username: &str, password: &str) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let password_hash = hash_password(password)?;

        sqlx::query(
            r#"
            INSERT INTO owner_credentials (id, username, password_hash, is_active, created_at)
            VALUES (?1, ?2, ?3, 1, ?4)
            "#,
        )
        .bind(&id)
        .bind(username)
        .bind(&password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, username),
            other => other,
        })?;

        debug!(%id, %username, "Owner credential created");
        Ok(id)
    }

    /// Deactivates an owner credential. Returns false if the username is unknown.
    pub async fn deactivate(&self, username: &str) -> DbResult<bool> {
        let result = sqlx::query("UPDATE owner_credentials SET is_active = 0 WHERE username = ?1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns true if `password` matches an active owner credential.
    pub async fn verify_password(&self, password: &str) -> DbResult<bool> {
        let hashes: Vec<String> = sqlx::query_scalar(
            "SELECT password_hash FROM owner_credentials WHERE is_active = 1",
        )
        .fetch_all(&self.pool)
        .await?;

        if hashes.is_empty() {
            warn!("No active owner credential configured");
            return Ok(false);
        }

        Ok(hashes.iter().any(|hash| verify_hash(password, hash)))
    }
}

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> DbResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

fn verify_hash(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => {
            warn!("Unparseable owner password hash");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
