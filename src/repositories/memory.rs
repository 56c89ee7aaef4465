//! In-process store implementing both contracts, used by the test suite.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use nanoid::nanoid;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{
        consulta::{Consulta, ConsultaUpdate, NewConsulta},
        user::{NewUser, User, UserUpdate},
    },
    repositories::{ConsultaStore, UserStore},
};

/// Records keyed by id, each tagged with its insertion sequence number.
type Table<T> = RwLock<HashMap<String, (u64, T)>>;

#[derive(Default)]
pub struct MemoryStore {
    users: Table<User>,
    consultas: Table<Consulta>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }
}

/// Creation order. Timestamps can tie, the sequence number cannot.
fn in_creation_order<T: Clone>(table: &HashMap<String, (u64, T)>) -> Vec<T> {
    let mut rows: Vec<_> = table.values().collect();
    rows.sort_by_key(|(seq, _)| *seq);
    rows.into_iter().map(|(_, item)| item.clone()).collect()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|(_, existing)| existing.email == user.email) {
            return Err(AppError::Duplicate {
                field: "email",
                value: user.email,
            });
        }

        let now = OffsetDateTime::now_utc();
        let record = User {
            id: nanoid!(),
            nome: user.nome,
            email: user.email,
            senha: user.senha,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id.clone(), (self.seq(), record.clone()));
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).map(|(_, user)| user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|(_, user)| user.email == email)
            .map(|(_, user)| user.clone()))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(in_creation_order(&*self.users.read().await))
    }

    async fn update(&self, id: &str, update: UserUpdate) -> AppResult<User> {
        update.validate()?;

        let mut users = self.users.write().await;
        if !users.contains_key(id) {
            return Err(AppError::NotFound(format!("user '{}'", id)));
        }
        if let Some(email) = &update.email {
            if users
                .values()
                .any(|(_, other)| other.id != id && &other.email == email)
            {
                return Err(AppError::Duplicate {
                    field: "email",
                    value: email.clone(),
                });
            }
        }

        let (_, user) = users
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", id)))?;
        if let Some(nome) = update.nome {
            user.nome = nome;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(senha) = update.senha {
            user.senha = senha;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", id)))
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|(_, user)| user.email == email))
    }
}

#[async_trait]
impl ConsultaStore for MemoryStore {
    async fn create(&self, consulta: NewConsulta) -> AppResult<Consulta> {
        let now = OffsetDateTime::now_utc();
        let record = Consulta {
            id: nanoid!(),
            cliente: consulta.cliente,
            tipo: consulta.tipo,
            data_consulta: consulta.data_consulta,
            status: consulta.status,
            atendente: consulta.atendente,
            created_at: now,
            updated_at: now,
        };
        self.consultas
            .write()
            .await
            .insert(record.id.clone(), (self.seq(), record.clone()));
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Consulta>> {
        Ok(self
            .consultas
            .read()
            .await
            .get(id)
            .map(|(_, consulta)| consulta.clone()))
    }

    async fn list(&self) -> AppResult<Vec<Consulta>> {
        Ok(in_creation_order(&*self.consultas.read().await))
    }

    async fn update(&self, id: &str, update: ConsultaUpdate) -> AppResult<Consulta> {
        update.validate()?;

        let mut consultas = self.consultas.write().await;
        let (_, consulta) = consultas
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("consulta '{}'", id)))?;
        if let Some(atendente) = update.atendente_change() {
            consulta.atendente = atendente.map(str::to_owned);
        }
        if let Some(cliente) = update.cliente {
            consulta.cliente = cliente;
        }
        if let Some(tipo) = update.tipo {
            consulta.tipo = tipo;
        }
        if let Some(data_consulta) = update.data_consulta {
            consulta.data_consulta = data_consulta;
        }
        if let Some(status) = update.status {
            consulta.status = status;
        }
        consulta.updated_at = OffsetDateTime::now_utc();
        Ok(consulta.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.consultas
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("consulta '{}'", id)))
    }
}
