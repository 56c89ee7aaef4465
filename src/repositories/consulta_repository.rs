use async_trait::async_trait;
use nanoid::nanoid;
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::consulta::{Consulta, ConsultaUpdate, NewConsulta},
    repositories::ConsultaStore,
};

/// PostgreSQL-backed consulta store. `atendente` is a plain column with no
/// foreign key.
#[derive(Clone)]
pub struct ConsultaRepository {
    pool: PgPool,
}

impl ConsultaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConsultaStore for ConsultaRepository {
    async fn create(&self, consulta: NewConsulta) -> AppResult<Consulta> {
        let id = nanoid!();
        let record = sqlx::query_as::<_, Consulta>(
            r#"
            INSERT INTO consultas
                (id, cliente_nome, cliente_telefone, tipo, data_consulta, status, atendente)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id,
                cliente_nome,
                cliente_telefone,
                tipo,
                data_consulta,
                status,
                atendente,
                created_at,
                updated_at
            "#,
        )
        .bind(&id)
        .bind(&consulta.cliente.nome)
        .bind(&consulta.cliente.telefone)
        .bind(consulta.tipo.as_str())
        .bind(consulta.data_consulta)
        .bind(consulta.status.as_str())
        .bind(&consulta.atendente)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(consulta_id = %record.id, tipo = %record.tipo, "consulta created");
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Consulta>> {
        let consulta = sqlx::query_as::<_, Consulta>(
            r#"
            SELECT
                id,
                cliente_nome,
                cliente_telefone,
                tipo,
                data_consulta,
                status,
                atendente,
                created_at,
                updated_at
            FROM consultas
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(consulta)
    }

    async fn list(&self) -> AppResult<Vec<Consulta>> {
        let consultas = sqlx::query_as::<_, Consulta>(
            r#"
            SELECT
                id,
                cliente_nome,
                cliente_telefone,
                tipo,
                data_consulta,
                status,
                atendente,
                created_at,
                updated_at
            FROM consultas
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(consultas)
    }

    async fn update(&self, id: &str, update: ConsultaUpdate) -> AppResult<Consulta> {
        update.validate()?;

        let atendente = update.atendente_change().map(|id| id.map(str::to_owned));
        let set_atendente = atendente.is_some();
        let (cliente_nome, cliente_telefone) = match update.cliente {
            Some(cliente) => (Some(cliente.nome), Some(cliente.telefone)),
            None => (None, None),
        };

        let consulta = sqlx::query_as::<_, Consulta>(
            r#"
            UPDATE consultas
            SET cliente_nome = COALESCE($2, cliente_nome),
                cliente_telefone = COALESCE($3, cliente_telefone),
                tipo = COALESCE($4, tipo),
                data_consulta = COALESCE($5, data_consulta),
                status = COALESCE($6, status),
                atendente = CASE WHEN $7 THEN $8 ELSE atendente END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id,
                cliente_nome,
                cliente_telefone,
                tipo,
                data_consulta,
                status,
                atendente,
                created_at,
                updated_at
            "#,
        )
        .bind(id)
        .bind(cliente_nome)
        .bind(cliente_telefone)
        .bind(update.tipo.map(|tipo| tipo.as_str()))
        .bind(update.data_consulta)
        .bind(update.status.map(|status| status.as_str()))
        .bind(set_atendente)
        .bind(atendente.flatten())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("consulta '{}'", id)))?;
        Ok(consulta)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM consultas
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("consulta '{}'", id)));
        }
        Ok(())
    }
}
