use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use time::OffsetDateTime;

use crate::{
    error::ValidationError,
    models::{not_empty, required},
};

#[derive(Debug, Serialize, Deserialize, Type, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sqlx(rename = "admin")]
    Admin,
    #[default]
    #[sqlx(rename = "funcionario")]
    Funcionario,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Funcionario => "funcionario",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "funcionario" => Ok(Role::Funcionario),
            other => Err(ValidationError::InvalidVariant {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Stored account. `senha` is kept exactly as supplied and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub nome: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub senha: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Unvalidated user payload as it arrives from the outside.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserInput {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub role: Option<String>,
}

/// A user that passed field validation and may be handed to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub(crate) nome: String,
    pub(crate) email: String,
    pub(crate) senha: String,
    pub(crate) role: Role,
}

impl NewUser {
    pub fn new(
        nome: impl Into<String>,
        email: impl Into<String>,
        senha: impl Into<String>,
        role: Option<Role>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            nome: required("nome", Some(nome.into()))?,
            email: required("email", Some(email.into()))?,
            senha: required("senha", Some(senha.into()))?,
            role: role.unwrap_or_default(),
        })
    }

    pub fn nome(&self) -> &str {
        &self.nome
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn senha(&self) -> &str {
        &self.senha
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl TryFrom<UserInput> for NewUser {
    type Error = ValidationError;

    fn try_from(input: UserInput) -> Result<Self, Self::Error> {
        let nome = required("nome", input.nome)?;
        let email = required("email", input.email)?;
        let senha = required("senha", input.senha)?;
        let role = match input.role {
            Some(role) => role.parse()?,
            None => Role::default(),
        };

        Ok(Self {
            nome,
            email,
            senha,
            role,
        })
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserUpdate {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        not_empty("nome", self.nome.as_deref())?;
        not_empty("email", self.email.as_deref())?;
        not_empty("senha", self.senha.as_deref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> UserInput {
        UserInput {
            nome: Some("Ana".into()),
            email: Some("ana@clinica.com".into()),
            senha: Some("segredo".into()),
            role: None,
        }
    }

    #[test]
    fn role_defaults_to_funcionario() {
        let user = NewUser::try_from(input()).unwrap();
        assert_eq!(user.role(), Role::Funcionario);
        assert_eq!(user.senha(), "segredo");
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        for field in ["nome", "email", "senha"] {
            let mut raw = input();
            match field {
                "nome" => raw.nome = None,
                "email" => raw.email = Some(String::new()),
                _ => raw.senha = None,
            }
            let err = NewUser::try_from(raw).unwrap_err();
            assert_eq!(err, ValidationError::Required { field });
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let mut raw = input();
        raw.role = Some("gerente".into());
        let err = NewUser::try_from(raw).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidVariant {
                field: "role",
                value: "gerente".into()
            }
        );
    }

    #[test]
    fn role_deserializes_only_known_values() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn input_from_json_reports_first_missing_field() {
        let raw: UserInput = serde_json::from_str(r#"{"email":"a@b.c","senha":"x"}"#).unwrap();
        let err = NewUser::try_from(raw).unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "nome" });
    }

    #[test]
    fn serialized_user_hides_password() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: "u1".into(),
            nome: "Ana".into(),
            email: "ana@clinica.com".into(),
            senha: "segredo".into(),
            role: Role::Admin,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("senha").is_none());
        assert_eq!(json["role"], "admin");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn update_rejects_blank_fields() {
        let update = UserUpdate {
            email: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            update.validate().unwrap_err(),
            ValidationError::Required { field: "email" }
        );
        assert!(UserUpdate::default().validate().is_ok());
    }
}
