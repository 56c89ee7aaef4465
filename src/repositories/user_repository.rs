use async_trait::async_trait;
use nanoid::nanoid;
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, User, UserUpdate},
    repositories::UserStore,
};

/// PostgreSQL-backed user store. Email uniqueness is the `users_email_key`
/// constraint; a violation surfaces as `AppError::Duplicate`.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn email_conflict(err: sqlx::Error, email: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Duplicate {
            field: "email",
            value: email.to_string(),
        },
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let id = nanoid!();
        let record = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, nome, email, senha, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, nome, email, senha, role, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(&user.nome)
        .bind(&user.email)
        .bind(&user.senha)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| email_conflict(e, &user.email))?;

        tracing::debug!(user_id = %record.id, "user created");
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nome, email, senha, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nome, email, senha, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nome, email, senha, role, created_at, updated_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update(&self, id: &str, update: UserUpdate) -> AppResult<User> {
        update.validate()?;

        let email = update.email.clone().unwrap_or_default();
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET nome = COALESCE($2, nome),
                email = COALESCE($3, email),
                senha = COALESCE($4, senha),
                role = COALESCE($5, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, nome, email, senha, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.nome)
        .bind(update.email)
        .bind(update.senha)
        .bind(update.role.map(|role| role.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| email_conflict(e, &email))?
        .ok_or_else(|| AppError::NotFound(format!("user '{}'", id)))?;
        Ok(user)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{}'", id)));
        }
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
