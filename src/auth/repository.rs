// Database repository for staff accounts

use sqlx::PgPool;

use crate::auth::{
    error::AuthError,
    models::{Role, User},
};

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new staff account
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        name: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, name, role, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Unique index is on LOWER(username)
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::UsernameAlreadyExists;
                }
            }
            AuthError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    /// Find a user by username (case-insensitive)
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, name, role, created_at, updated_at
            FROM users
            WHERE LOWER(username) = LOWER($1)
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, name, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(user)
    }

    /// List users, optionally filtered by a case-insensitive search over
    /// username and display name
    pub async fn find_all(&self, search: Option<&str>) -> Result<Vec<User>, AuthError> {
        let users = match search {
            Some(term) => {
                let pattern = format!("%{}%", term);
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, username, password_hash, name, role, created_at, updated_at
                    FROM users
                    WHERE username ILIKE $1 OR name ILIKE $1
                    ORDER BY username
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, username, password_hash, name, role, created_at, updated_at
                    FROM users
                    ORDER BY username
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(users)
    }

    /// Update a staff account; each field falls back to its stored value
    pub async fn update_user(
        &self,
        id: i32,
        username: Option<&str>,
        password_hash: Option<&str>,
        name: Option<&str>,
        role: Option<Role>,
    ) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = COALESCE($1, username),
                password_hash = COALESCE($2, password_hash),
                name = COALESCE($3, name),
                role = COALESCE($4, role),
                updated_at = NOW()
            WHERE id = $5
            RETURNING id, username, password_hash, name, role, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::UsernameAlreadyExists;
                }
            }
            AuthError::DatabaseError(e.to_string())
        })?
        .ok_or(AuthError::UserNotFound)?;

        Ok(user)
    }

    /// Delete a staff account
    pub async fn delete_user(&self, id: i32) -> Result<(), AuthError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }
}
