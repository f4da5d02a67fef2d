// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! JSON-over-HTTP gateway.
//!
//! ## Endpoints
//!
//! All endpoints are `POST` and take `{"account", "password", "amount"}`
//! (`amount` is ignored by `/history`).
//!
//! - `POST /create` - Open an account with `amount` as opening balance
//! - `POST /history` - Balance and transaction history
//! - `POST /deposit` - Credit `amount`
//! - `POST /withdraw` - Debit `amount`
//!
//! Failures answer `{"error": "<message>"}` with a 4xx status for request
//! and domain errors and 500 for storage failures.
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:8080/create \
//!   -H "Content-Type: application/json" \
//!   -d '{"account": "A1", "password": "pw", "amount": 100}'
//!
//! curl -X POST http://localhost:8080/history \
//!   -H "Content-Type: application/json" \
//!   -d '{"account": "A1", "password": "pw"}'
//! ```

use crate::{AccountId, AccountRecord, Amount, Ledger, LedgerError, Transaction};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::future::{Future, IntoFuture};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;

// === Request/Response DTOs ===

/// Request body shared by every endpoint.
///
/// Missing fields decode as empty strings / zero, so an absent `account`
/// is reported as "account is empty" rather than as a decoding failure.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRequest {
    pub account: String,
    pub password: String,
    pub amount: Amount,
}

impl AccountRequest {
    pub fn new(account: impl Into<String>, password: impl Into<String>, amount: Amount) -> Self {
        Self {
            account: account.into(),
            password: password.into(),
            amount,
        }
    }

    /// Pre-dispatch checks: account first, then password, then identifier
    /// shape.
    pub fn validate(&self) -> Result<AccountId, LedgerError> {
        if self.account.is_empty() {
            return Err(LedgerError::EmptyAccount);
        }
        if self.password.is_empty() {
            return Err(LedgerError::EmptyPassword);
        }
        AccountId::parse(&self.account)
    }
}

/// Response body for `/history`. The stored password is never echoed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryResponse {
    pub balance: Amount,
    pub history: Vec<Transaction>,
}

impl From<AccountRecord> for HistoryResponse {
    fn from(record: AccountRecord) -> Self {
        Self {
            balance: record.balance,
            history: record.history,
        }
    }
}

/// Response body for errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// === Application State ===

/// Shared application state containing the ledger.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(ledger),
        }
    }
}

// === Error Handling ===

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum AppError {
    /// Body was not JSON of the expected shape.
    Body(JsonRejection),
    Ledger(LedgerError),
    /// The blocking task running the ledger call panicked or was cancelled.
    Worker(JoinError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Body(rejection)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError::Ledger(err)
    }
}

impl From<JoinError> for AppError {
    fn from(err: JoinError) -> Self {
        AppError::Worker(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Body(_) => StatusCode::BAD_REQUEST,
            AppError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Ledger(err) => match err {
                LedgerError::EmptyAccount
                | LedgerError::EmptyPassword
                | LedgerError::InvalidAccount
                | LedgerError::InvalidAmount => StatusCode::BAD_REQUEST,
                LedgerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                LedgerError::NotFound => StatusCode::NOT_FOUND,
                LedgerError::AlreadyExists => StatusCode::CONFLICT,
                LedgerError::InsufficientBalance | LedgerError::Overflow => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                LedgerError::Storage { .. } | LedgerError::Codec { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Body(rejection) => rejection.body_text(),
            AppError::Ledger(err) => err.to_string(),
            AppError::Worker(err) => format!("ledger task failed: {err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        } else {
            tracing::warn!(%status, error = %message, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

// === Handlers ===

/// Runs a ledger call on the blocking pool; ledger calls do synchronous
/// file I/O under a blocking per-account lock.
async fn with_ledger<T, F>(state: &AppState, op: F) -> Result<T, AppError>
where
    F: FnOnce(&Ledger) -> Result<T, LedgerError> + Send + 'static,
    T: Send + 'static,
{
    let ledger = Arc::clone(&state.ledger);
    Ok(tokio::task::spawn_blocking(move || op(&ledger)).await??)
}

/// POST /create - Open an account.
async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let id = request.validate()?;
    with_ledger(&state, move |ledger| {
        ledger.create(&id, &request.password, request.amount)
    })
    .await?;
    Ok(Json(json!({})))
}

/// POST /history - Balance and transactions, password omitted.
async fn account_history(
    State(state): State<AppState>,
    payload: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Json<HistoryResponse>, AppError> {
    let Json(request) = payload?;
    let id = request.validate()?;
    let record = with_ledger(&state, move |ledger| ledger.history(&id, &request.password)).await?;
    Ok(Json(record.into()))
}

/// POST /deposit - Credit an account.
async fn deposit(
    State(state): State<AppState>,
    payload: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let id = request.validate()?;
    with_ledger(&state, move |ledger| {
        ledger.deposit(&id, &request.password, request.amount)
    })
    .await?;
    Ok(Json(json!({})))
}

/// POST /withdraw - Debit an account.
async fn withdraw(
    State(state): State<AppState>,
    payload: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let id = request.validate()?;
    with_ledger(&state, move |ledger| {
        ledger.withdraw(&id, &request.password, request.amount)
    })
    .await?;
    Ok(Json(json!({})))
}

// === Router ===

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/create", post(create_account))
        .route("/history", post(account_history))
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Serving ===

/// Serves the gateway on `listener` until `shutdown` resolves.
///
/// After `shutdown` resolves no new connections are accepted; in-flight
/// requests get `grace` to finish before the server is dropped.
pub async fn serve<S>(
    listener: TcpListener,
    state: AppState,
    shutdown: S,
    grace: Duration,
) -> io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (draining_tx, mut draining_rx) = watch::channel(false);

    let server = axum::serve(listener, router(state)).with_graceful_shutdown(async move {
        shutdown.await;
        let _ = draining_tx.send(true);
    });

    let grace_elapsed = async move {
        let draining = draining_rx.wait_for(|draining| *draining).await.is_ok();
        if !draining {
            // The server exited on its own; let it win the select.
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server.into_future() => result,
        () = grace_elapsed => {
            tracing::warn!(?grace, "grace period elapsed, dropping in-flight requests");
            Ok(())
        }
    }
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
