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

//! REST API surface for the ledger.
//!
//! ## Endpoints
//!
//! - `POST /api/send` - Submit a transfer (rate limited per client IP)
//! - `GET /api/transactions?count=N` - List recent transfers
//! - `GET /api/wallet/{address}/balance` - Get a wallet
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:8080/api/send \
//!   -H "Content-Type: application/json" \
//!   -d '{"from": "<64 hex chars>", "to": "<64 hex chars>", "amount": "30.00"}'
//!
//! curl http://localhost:8080/api/transactions?count=5
//! curl http://localhost:8080/api/wallet/<64 hex chars>/balance
//! ```
//!
//! Amounts travel as decimal strings, never as binary floats. Every failure
//! body is `{"error": <message>, "code": <KIND>}`.

use crate::engine::Engine;
use crate::error::LedgerError;
use crate::rate_limit::RateLimiter;
use crate::transfer::Transfer;
use crate::wallet::Wallet;
use axum::{
    Json, Router,
    extract::{ConnectInfo, Path, Query, Request, State},
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, warn};

// === Request/Response DTOs ===

/// Request body for submitting a transfer.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

/// Query parameters for the recent-transactions listing.
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub count: Option<i64>,
}

/// Response body for errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state: the engine and the admission control guarding
/// transfer submissions.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub limiter: Arc<RateLimiter>,
}

// === Error Handling ===

/// Wrapper for converting [`LedgerError`] into HTTP responses.
pub struct AppError(LedgerError);

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            LedgerError::InvalidRequest => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            LedgerError::InvalidAddress => (StatusCode::BAD_REQUEST, "INVALID_ADDRESS"),
            LedgerError::SelfTransfer => (StatusCode::BAD_REQUEST, "SELF_TRANSFER"),
            LedgerError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            LedgerError::InvalidCount => (StatusCode::BAD_REQUEST, "INVALID_COUNT"),
            LedgerError::SenderNotFound => (StatusCode::NOT_FOUND, "SENDER_NOT_FOUND"),
            LedgerError::ReceiverNotFound => (StatusCode::NOT_FOUND, "RECEIVER_NOT_FOUND"),
            LedgerError::WalletNotFound => (StatusCode::NOT_FOUND, "WALLET_NOT_FOUND"),
            LedgerError::WalletExists => (StatusCode::CONFLICT, "WALLET_EXISTS"),
            LedgerError::InsufficientFunds => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_FUNDS")
            }
            LedgerError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        // Storage details stay in the log, not in the response body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed on storage");
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /api/send - Submit a transfer.
async fn send_transfer(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<Transfer>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "invalid request body");
        AppError(LedgerError::InvalidRequest)
    })?;

    let transfer = state
        .engine
        .transfer(&request.from, &request.to, request.amount)?;
    Ok(Json(transfer))
}

/// GET /api/transactions - List recent transfers, most recent first.
async fn recent_transfers(
    State(state): State<AppState>,
    query: Result<Query<RecentQuery>, QueryRejection>,
) -> Result<Json<Vec<Transfer>>, AppError> {
    let Query(params) = query.map_err(|_| AppError(LedgerError::InvalidCount))?;
    let transfers = state.engine.recent(params.count)?;
    Ok(Json(transfers))
}

/// GET /api/wallet/{address}/balance - Get a wallet by address.
async fn wallet_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Wallet>, AppError> {
    let wallet = state.engine.wallet_balance(&address)?;
    Ok(Json(wallet))
}

/// Admission control in front of the transfer handler. Runs before the
/// engine sees the request; the engine's contract is untouched by it.
async fn enforce_rate_limit(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if !state.limiter.allow(peer.ip()) {
        warn!(peer = %peer.ip(), "transfer request rate limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "too many requests".to_string(),
                code: "RATE_LIMITED".to_string(),
            }),
        )
            .into_response();
    }

    next.run(request).await
}

// === Router ===

/// Builds the application router. Serve it with connect-info so the rate
/// limiter can see client addresses:
///
/// ```ignore
/// axum::serve(listener, router(state).into_make_service_with_connect_info::<SocketAddr>())
/// ```
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/send",
            post(send_transfer)
                .layer(middleware::from_fn_with_state(state.clone(), enforce_rate_limit)),
        )
        .route("/api/transactions", get(recent_transfers))
        .route("/api/wallet/{address}/balance", get(wallet_balance))
        .with_state(state)
}
