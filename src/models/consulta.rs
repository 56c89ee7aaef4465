use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use time::OffsetDateTime;

use crate::{
    error::ValidationError,
    models::{not_empty, required},
};

#[derive(Debug, Serialize, Deserialize, Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "snake_case")]
pub enum TipoConsulta {
    #[sqlx(rename = "dentista")]
    Dentista,
    #[sqlx(rename = "pediatra")]
    Pediatra,
    #[sqlx(rename = "clinico_geral")]
    ClinicoGeral,
    #[sqlx(rename = "outros")]
    Outros,
}

impl TipoConsulta {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoConsulta::Dentista => "dentista",
            TipoConsulta::Pediatra => "pediatra",
            TipoConsulta::ClinicoGeral => "clinico_geral",
            TipoConsulta::Outros => "outros",
        }
    }
}

impl fmt::Display for TipoConsulta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TipoConsulta {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dentista" => Ok(TipoConsulta::Dentista),
            "pediatra" => Ok(TipoConsulta::Pediatra),
            "clinico_geral" => Ok(TipoConsulta::ClinicoGeral),
            "outros" => Ok(TipoConsulta::Outros),
            other => Err(ValidationError::InvalidVariant {
                field: "tipo",
                value: other.to_string(),
            }),
        }
    }
}

/// Booking status. Transitions are not guarded: any value may follow any other.
#[derive(Debug, Serialize, Deserialize, Type, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "snake_case")]
pub enum StatusConsulta {
    #[default]
    #[sqlx(rename = "nova")]
    Nova,
    #[sqlx(rename = "em_analise")]
    EmAnalise,
    #[sqlx(rename = "confirmada")]
    Confirmada,
    #[sqlx(rename = "cancelada")]
    Cancelada,
}

impl StatusConsulta {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusConsulta::Nova => "nova",
            StatusConsulta::EmAnalise => "em_analise",
            StatusConsulta::Confirmada => "confirmada",
            StatusConsulta::Cancelada => "cancelada",
        }
    }
}

impl fmt::Display for StatusConsulta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusConsulta {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nova" => Ok(StatusConsulta::Nova),
            "em_analise" => Ok(StatusConsulta::EmAnalise),
            "confirmada" => Ok(StatusConsulta::Confirmada),
            "cancelada" => Ok(StatusConsulta::Cancelada),
            other => Err(ValidationError::InvalidVariant {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Client data embedded in every consulta. Stored in the same row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Cliente {
    #[sqlx(rename = "cliente_nome")]
    pub nome: String,
    #[sqlx(rename = "cliente_telefone")]
    pub telefone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Consulta {
    pub id: String,
    #[sqlx(flatten)]
    pub cliente: Cliente,
    pub tipo: TipoConsulta,
    #[serde(with = "time::serde::rfc3339")]
    pub data_consulta: OffsetDateTime,
    pub status: StatusConsulta,
    /// Id of the attending user. Not checked against the users table.
    pub atendente: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ClienteInput {
    pub nome: Option<String>,
    pub telefone: Option<String>,
}

/// Unvalidated consulta payload as it arrives from the outside.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultaInput {
    pub cliente: Option<ClienteInput>,
    pub tipo: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub data_consulta: Option<OffsetDateTime>,
    pub status: Option<String>,
    pub atendente: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewConsulta {
    pub(crate) cliente: Cliente,
    pub(crate) tipo: TipoConsulta,
    pub(crate) data_consulta: OffsetDateTime,
    pub(crate) status: StatusConsulta,
    pub(crate) atendente: Option<String>,
}

impl NewConsulta {
    pub fn new(
        cliente: Cliente,
        tipo: TipoConsulta,
        data_consulta: OffsetDateTime,
    ) -> Result<Self, ValidationError> {
        let cliente = Cliente {
            nome: required("cliente.nome", Some(cliente.nome))?,
            telefone: required("cliente.telefone", Some(cliente.telefone))?,
        };

        Ok(Self {
            cliente,
            tipo,
            data_consulta,
            status: StatusConsulta::default(),
            atendente: None,
        })
    }

    pub fn with_status(mut self, status: StatusConsulta) -> Self {
        self.status = status;
        self
    }

    /// An empty id is the same as no atendente.
    pub fn with_atendente(mut self, user_id: impl Into<String>) -> Self {
        self.atendente = Some(user_id.into()).filter(|id| !id.is_empty());
        self
    }

    pub fn cliente(&self) -> &Cliente {
        &self.cliente
    }

    pub fn tipo(&self) -> TipoConsulta {
        self.tipo
    }

    pub fn data_consulta(&self) -> OffsetDateTime {
        self.data_consulta
    }

    pub fn status(&self) -> StatusConsulta {
        self.status
    }

    pub fn atendente(&self) -> Option<&str> {
        self.atendente.as_deref()
    }
}

impl TryFrom<ConsultaInput> for NewConsulta {
    type Error = ValidationError;

    fn try_from(input: ConsultaInput) -> Result<Self, Self::Error> {
        let cliente = input.cliente.unwrap_or_default();
        let cliente = Cliente {
            nome: required("cliente.nome", cliente.nome)?,
            telefone: required("cliente.telefone", cliente.telefone)?,
        };
        let tipo = required("tipo", input.tipo)?.parse()?;
        let data_consulta = input
            .data_consulta
            .ok_or(ValidationError::Required { field: "dataConsulta" })?;
        let status = match input.status {
            Some(status) => status.parse()?,
            None => StatusConsulta::default(),
        };
        let atendente = input.atendente.filter(|id| !id.is_empty());

        Ok(Self {
            cliente,
            tipo,
            data_consulta,
            status,
            atendente,
        })
    }
}

/// Partial update. `atendente: Some(None)` clears the reference, and so does
/// `Some(Some(""))`.
#[derive(Debug, Default, Clone)]
pub struct ConsultaUpdate {
    pub cliente: Option<Cliente>,
    pub tipo: Option<TipoConsulta>,
    pub data_consulta: Option<OffsetDateTime>,
    pub status: Option<StatusConsulta>,
    pub atendente: Option<Option<String>>,
}

impl ConsultaUpdate {
    pub fn status(status: StatusConsulta) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// The requested atendente change with an empty id read as a clear.
    pub fn atendente_change(&self) -> Option<Option<&str>> {
        self.atendente
            .as_ref()
            .map(|id| id.as_deref().filter(|id| !id.is_empty()))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(cliente) = &self.cliente {
            not_empty("cliente.nome", Some(&cliente.nome))?;
            not_empty("cliente.telefone", Some(&cliente.telefone))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn input() -> ConsultaInput {
        ConsultaInput {
            cliente: Some(ClienteInput {
                nome: Some("Maria".into()),
                telefone: Some("11999990000".into()),
            }),
            tipo: Some("pediatra".into()),
            data_consulta: Some(datetime!(2026-11-03 14:30 UTC)),
            status: None,
            atendente: None,
        }
    }

    #[test]
    fn status_defaults_to_nova() {
        let consulta = NewConsulta::try_from(input()).unwrap();
        assert_eq!(consulta.status(), StatusConsulta::Nova);
        assert_eq!(consulta.tipo(), TipoConsulta::Pediatra);
        assert_eq!(consulta.atendente(), None);
    }

    #[test]
    fn unknown_tipo_is_rejected() {
        let mut raw = input();
        raw.tipo = Some("cardiologista".into());
        let err = NewConsulta::try_from(raw).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidVariant {
                field: "tipo",
                value: "cardiologista".into()
            }
        );
    }

    #[test]
    fn missing_tipo_is_required() {
        let mut raw = input();
        raw.tipo = None;
        let err = NewConsulta::try_from(raw).unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "tipo" });
    }

    #[test]
    fn missing_data_consulta_is_rejected() {
        let mut raw = input();
        raw.data_consulta = None;
        let err = NewConsulta::try_from(raw).unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "dataConsulta" });
    }

    #[test]
    fn cliente_fields_are_required() {
        let mut raw = input();
        raw.cliente = None;
        assert_eq!(
            NewConsulta::try_from(raw).unwrap_err(),
            ValidationError::Required { field: "cliente.nome" }
        );

        let mut raw = input();
        raw.cliente = Some(ClienteInput {
            nome: Some("Maria".into()),
            telefone: Some(String::new()),
        });
        assert_eq!(
            NewConsulta::try_from(raw).unwrap_err(),
            ValidationError::Required {
                field: "cliente.telefone"
            }
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut raw = input();
        raw.status = Some("adiado".into());
        let err = NewConsulta::try_from(raw).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidVariant {
                field: "status",
                value: "adiado".into()
            }
        );
    }

    #[test]
    fn input_parses_wire_field_names() {
        let raw: ConsultaInput = serde_json::from_str(
            r#"{
                "cliente": { "nome": "Maria", "telefone": "11999990000" },
                "tipo": "clinico_geral",
                "dataConsulta": "2026-11-03T14:30:00Z",
                "status": "confirmada",
                "atendente": "u-42"
            }"#,
        )
        .unwrap();
        let consulta = NewConsulta::try_from(raw).unwrap();
        assert_eq!(consulta.tipo(), TipoConsulta::ClinicoGeral);
        assert_eq!(consulta.status(), StatusConsulta::Confirmada);
        assert_eq!(consulta.data_consulta(), datetime!(2026-11-03 14:30 UTC));
        assert_eq!(consulta.atendente(), Some("u-42"));
    }

    #[test]
    fn serialized_consulta_embeds_cliente() {
        let now = datetime!(2026-10-17 09:00 UTC);
        let consulta = Consulta {
            id: "c1".into(),
            cliente: Cliente {
                nome: "Maria".into(),
                telefone: "11999990000".into(),
            },
            tipo: TipoConsulta::Dentista,
            data_consulta: datetime!(2026-11-03 14:30 UTC),
            status: StatusConsulta::EmAnalise,
            atendente: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&consulta).unwrap();
        assert_eq!(json["cliente"]["telefone"], "11999990000");
        assert_eq!(json["status"], "em_analise");
        assert_eq!(json["dataConsulta"], "2026-11-03T14:30:00Z");
        assert!(json["atendente"].is_null());
    }

    #[test]
    fn enum_strings_round_trip_through_from_str() {
        for status in [
            StatusConsulta::Nova,
            StatusConsulta::EmAnalise,
            StatusConsulta::Confirmada,
            StatusConsulta::Cancelada,
        ] {
            assert_eq!(status.as_str().parse::<StatusConsulta>().unwrap(), status);
        }
    }

    #[test]
    fn empty_atendente_is_no_atendente() {
        let consulta = NewConsulta::try_from(input()).unwrap().with_atendente("");
        assert_eq!(consulta.atendente(), None);

        let consulta = consulta.with_atendente("u-7");
        assert_eq!(consulta.atendente(), Some("u-7"));
    }

    #[test]
    fn empty_atendente_update_clears_reference() {
        let update = ConsultaUpdate {
            atendente: Some(Some(String::new())),
            ..Default::default()
        };
        assert_eq!(update.atendente_change(), Some(None));

        let update = ConsultaUpdate {
            atendente: Some(Some("u-7".into())),
            ..Default::default()
        };
        assert_eq!(update.atendente_change(), Some(Some("u-7")));
        assert_eq!(ConsultaUpdate::default().atendente_change(), None);
    }

    #[test]
    fn update_rejects_blank_cliente() {
        let update = ConsultaUpdate {
            cliente: Some(Cliente {
                nome: String::new(),
                telefone: "1".into(),
            }),
            ..Default::default()
        };
        assert_eq!(
            update.validate().unwrap_err(),
            ValidationError::Required {
                field: "cliente.nome"
            }
        );
    }
}
