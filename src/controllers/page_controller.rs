use axum::Json;
use serde::Serialize;

/// Static screen descriptor returned by the placeholder pages.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TelaResponse {
    pub tela: &'static str,
    pub mensagem: &'static str,
}

pub async fn login() -> Json<TelaResponse> {
    Json(TelaResponse {
        tela: "login",
        mensagem: "Tela de login",
    })
}

// Meant to be protected once authentication exists; no check today.
pub async fn dashboard() -> Json<TelaResponse> {
    Json(TelaResponse {
        tela: "dashboard",
        mensagem: "Painel administrativo",
    })
}
