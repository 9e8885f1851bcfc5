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

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wallet_ledger_rs::http::{self, AppState};
use wallet_ledger_rs::{Engine, RateLimiter, Store, config, provision};

/// Wallet Ledger - serve atomic wallet transfers over HTTP
///
/// Opens (or creates) the SQLite database, seeds an initial set of wallets
/// on first run, and serves the transfer API until terminated.
#[derive(Parser, Debug)]
#[command(name = "wallet-ledger-rs")]
#[command(about = "A wallet ledger service with atomic transfers", long_about = None)]
struct Args {
    /// Path to the SQLite database file (created on first run)
    #[arg(long, value_name = "FILE", default_value = config::DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value = config::DEFAULT_LISTEN_ADDR)]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Some(dir) = args.db.parent() {
        if !dir.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                error!(dir = %dir.display(), error = %e, "failed to create storage directory");
                process::exit(1);
            }
        }
    }

    let store = match Store::open(&args.db) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(db = %args.db.display(), error = %e, "failed to open database");
            process::exit(1);
        }
    };

    // Provisioning completes before the listener binds, so no request can
    // ever observe a half-seeded store.
    if let Err(e) = provision::seed_wallets(
        &store,
        config::SEED_WALLET_COUNT,
        config::SEED_WALLET_BALANCE,
    ) {
        error!(error = %e, "failed to seed wallets");
        process::exit(1);
    }

    let state = AppState {
        engine: Arc::new(Engine::new(Arc::clone(&store))),
        limiter: Arc::new(RateLimiter::new(
            config::RATE_LIMIT_PER_SEC,
            config::RATE_LIMIT_BURST,
        )),
    };
    let app = http::router(state);

    let listener = match TcpListener::bind(args.listen).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %args.listen, error = %e, "failed to bind listener");
            process::exit(1);
        }
    };

    info!(addr = %args.listen, db = %args.db.display(), "server is running");

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!(error = %e, "server terminated");
        process::exit(1);
    }
}
