use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use tokio::sync::RwLock;

use std::sync::Arc;

use crate::{advice, aggregates, exchange, reports, transactions};
use engine::Ledger;

static PRINCIPAL_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-principal");

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<RwLock<Ledger>>,
}

/// Identity of the caller, as forwarded by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal(pub String);

/// `TypedHeader` for the principal header.
///
/// Every request must contain a non-empty "x-principal" entry in the header;
/// anonymous callers are rejected.
#[derive(Debug)]
struct PrincipalHeader(String);

impl Header for PrincipalHeader {
    fn name() -> &'static axum::http::HeaderName {
        &PRINCIPAL_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(PrincipalHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-principal header"),
        }
    }
}

async fn auth(
    principal_header: Option<TypedHeader<PrincipalHeader>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(PrincipalHeader(principal))) = principal_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(Principal(principal));
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/transactions", post(transactions::add))
        .route("/transactions/filter", post(reports::filtered))
        .route("/balance", post(aggregates::balance))
        .route("/income", post(aggregates::income))
        .route("/expense", post(aggregates::expense))
        .route("/report", post(reports::by_month))
        .route("/report/income", post(reports::income))
        .route("/report/expense", post(reports::expense))
        .route("/exchange-rate", get(exchange::rate))
        .route("/advice", post(advice::get))
        .route_layer(middleware::from_fn(auth))
        .with_state(state)
}

pub async fn run(ledger: Ledger, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Ledger listening on {}", addr);

    let state = ServerState {
        ledger: Arc::new(RwLock::new(ledger)),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
