//! Process bootstrap: background database connection, listener, shutdown.

use std::future::Future;

use tokio::net::TcpListener;

use crate::{config::Config, context::ApiContext, error::AppResult, routes::build_router};

/// Starts the database connection and the HTTP listener side by side.
///
/// The listener does not wait for the connection: an unreachable or missing
/// database is logged by the connection task while requests keep being served.
pub async fn run(config: Config) -> AppResult<()> {
    let ctx = ApiContext::new(config);
    let connecting = ctx.connect_in_background();

    let listener = bind(&ctx.config).await?;
    serve(listener, ctx.clone(), shutdown_signal()).await?;

    ctx.teardown(connecting).await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

pub async fn bind(config: &Config) -> AppResult<TcpListener> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    Ok(listener)
}

pub async fn serve<F>(listener: TcpListener, ctx: ApiContext, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(ctx);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::{Value, json};
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use tokio::sync::oneshot;

    async fn get_json(addr: SocketAddr, path: &str) -> (StatusCode, Value) {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let response = client
            .get(format!("http://{}{}", addr, path))
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn listens_while_database_is_unreachable() {
        let config = Config {
            database_url: Some("postgres://consultas@127.0.0.1:1/consultas".into()),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            ..Config::default()
        };
        let ctx = ApiContext::new(config);
        let connecting = ctx.connect_in_background();

        let listener = bind(&ctx.config).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, ctx.clone(), async move {
            stopped.await.ok();
        }));

        let (status, body) = get_json(addr, "/login").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "tela": "login", "mensagem": "Tela de login" }));

        // The failed connection attempt does not take the listener down.
        connecting.await.unwrap();
        assert!(ctx.db().is_none());
        let (status, body) = get_json(addr, "/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "tela": "dashboard", "mensagem": "Painel administrativo" })
        );

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn listens_without_database_url() {
        let config = Config {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            ..Config::default()
        };
        let ctx = ApiContext::new(config);
        let connecting = ctx.connect_in_background();

        let listener = bind(&ctx.config).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve(listener, ctx.clone(), std::future::pending()));

        let (status, body) = get_json(addr, "/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tela"], "dashboard");

        server.abort();
        ctx.teardown(connecting).await;
        assert!(ctx.db().is_none());
    }
}
