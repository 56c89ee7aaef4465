use crate::{
    context::ApiContext,
    controllers::page_controller::{dashboard, login},
};
use axum::{Router, routing::get};

pub fn page_routes() -> Router<ApiContext> {
    Router::new()
        .route("/login", get(login))
        .route("/dashboard", get(dashboard))
}
