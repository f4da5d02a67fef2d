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

use account_ledger_rs::gateway::{self, AppState};
use account_ledger_rs::{Config, Ledger, telemetry};
use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    telemetry::init();

    let root = config.storage_root();
    let ledger = Ledger::open(&root)
        .with_context(|| format!("failed to open account directory '{}'", root.display()))?;
    tracing::info!(root = %ledger.root().display(), "account storage ready");

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "account ledger listening");

    gateway::serve(
        listener,
        AppState::new(ledger),
        gateway::shutdown_signal(),
        config.shutdown_grace(),
    )
    .await
    .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}
