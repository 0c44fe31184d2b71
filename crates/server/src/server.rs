use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::TypedHeader;

use std::sync::Arc;

use crate::{
    balances, history,
    identity::{AccountIdHeader, AccountRoleHeader, Identity, Role},
    transfer, treasury,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Turns the gateway-verified headers into an [`Identity`] extension.
///
/// Requests without a usable `account-id` header never reach a handler.
async fn identity(
    account_header: Option<TypedHeader<AccountIdHeader>>,
    role_header: Option<TypedHeader<AccountRoleHeader>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(AccountIdHeader(account_id))) = account_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let role = role_header.map_or(Role::Player, |header| header.0.0);
    request
        .extensions_mut()
        .insert(Identity { account_id, role });
    Ok(next.run(request).await)
}

pub fn app(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };
    Router::new()
        .route("/transfer", post(transfer::create))
        .route("/balances", get(balances::all))
        .route("/balance/{currency}", get(balances::one))
        .route("/history", get(history::list))
        .route("/admin/treasury", get(treasury::show))
        .route_layer(middleware::from_fn(identity))
        .with_state(state)
}

pub async fn run(engine: Arc<Engine>) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Arc<Engine>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Economy server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}

pub fn spawn_with_listener(
    engine: Arc<Engine>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
