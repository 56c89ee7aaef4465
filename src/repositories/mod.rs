//! Persistence contracts for users and consultas.
//!
//! Both stores only create, read, update and delete. Field validation happens
//! before a record reaches them (see [`crate::models`]); the stores add email
//! uniqueness and timestamps.

pub mod consulta_repository;
pub mod memory;
pub mod user_repository;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        consulta::{Consulta, ConsultaUpdate, NewConsulta, StatusConsulta},
        user::{NewUser, User, UserUpdate},
    },
};

pub use consulta_repository::ConsultaRepository;
pub use memory::MemoryStore;
pub use user_repository::UserRepository;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `AppError::Duplicate` when the email is taken.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn list(&self) -> AppResult<Vec<User>>;

    async fn update(&self, id: &str, update: UserUpdate) -> AppResult<User>;

    async fn delete(&self, id: &str) -> AppResult<()>;

    async fn email_exists(&self, email: &str) -> AppResult<bool>;
}

#[async_trait]
pub trait ConsultaStore: Send + Sync {
    async fn create(&self, consulta: NewConsulta) -> AppResult<Consulta>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Consulta>>;

    async fn list(&self) -> AppResult<Vec<Consulta>>;

    async fn update(&self, id: &str, update: ConsultaUpdate) -> AppResult<Consulta>;

    async fn delete(&self, id: &str) -> AppResult<()>;

    async fn cancelar(&self, id: &str) -> AppResult<Consulta> {
        self.update(id, ConsultaUpdate::status(StatusConsulta::Cancelada))
            .await
    }
}

/// Looks up the user a consulta points at. A dangling id yields `None`.
pub async fn resolve_atendente<U>(users: &U, consulta: &Consulta) -> AppResult<Option<User>>
where
    U: UserStore + ?Sized,
{
    match consulta.atendente.as_deref() {
        Some(id) => users.find_by_id(id).await,
        None => Ok(None),
    }
}
