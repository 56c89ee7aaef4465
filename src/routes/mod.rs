pub mod page_routes;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::context::ApiContext;

pub fn build_router(ctx: ApiContext) -> Router {
    Router::new()
        .merge(page_routes::page_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
