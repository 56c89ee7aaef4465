//! Application context handed to every handler as router state.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::{sync::OnceCell, task::JoinHandle};

use crate::{
    config::Config,
    db,
    error::{AppError, AppResult},
    repositories::{ConsultaRepository, UserRepository},
};

#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<Config>,
    db: Arc<OnceCell<PgPool>>,
}

impl ApiContext {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            db: Arc::new(OnceCell::new()),
        }
    }

    /// The pool, once the background connection has succeeded.
    pub fn db(&self) -> Option<&PgPool> {
        self.db.get()
    }

    pub fn users(&self) -> Option<UserRepository> {
        self.db().cloned().map(UserRepository::new)
    }

    pub fn consultas(&self) -> Option<ConsultaRepository> {
        self.db().cloned().map(ConsultaRepository::new)
    }

    /// Connects and migrates in a detached task. The outcome is only logged;
    /// callers are not expected to wait on the handle before serving.
    pub fn connect_in_background(&self) -> JoinHandle<()> {
        let ctx = self.clone();
        tokio::spawn(async move {
            match ctx.connect().await {
                Ok(()) => tracing::info!("database connected"),
                Err(e) => tracing::error!(error = %e, "database connection failed"),
            }
        })
    }

    async fn connect(&self) -> AppResult<()> {
        let url = self
            .config
            .database_url
            .as_deref()
            .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;

        let pool = db::init_pool(url, self.config.max_connections).await?;
        db::migrate(&pool).await?;

        self.db
            .set(pool)
            .map_err(|_| AppError::Other("database already connected".to_string()))
    }

    /// Cancels a connection attempt still in flight, then closes the pool.
    /// The aborted task is awaited so nothing can fill the pool slot after
    /// the pool has been closed.
    pub async fn teardown(&self, connecting: JoinHandle<()>) {
        connecting.abort();
        if let Err(e) = connecting.await {
            if !e.is_cancelled() {
                tracing::error!(error = %e, "database connection task failed");
            }
        }
        self.shutdown().await;
    }

    /// Closes the pool if one was ever opened.
    pub async fn shutdown(&self) {
        if let Some(pool) = self.db() {
            pool.close().await;
            tracing::info!("database pool closed");
        }
    }
}
