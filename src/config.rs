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

//! Process configuration.
//!
//! Every option can be given as a flag or through its environment variable.

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_ACCOUNT_PATH: &str = "accounts";
const DEFAULT_HTTP_PORT: u16 = 8080;

/// Account Ledger - JSON/HTTP account service backed by one file per account
#[derive(Parser, Debug, Clone)]
#[command(name = "account-ledger")]
#[command(about = "Serves account create/history/deposit/withdraw over HTTP", long_about = None)]
pub struct Config {
    /// Directory holding one `<account>.json` file per account
    ///
    /// Created (with parents) if missing. Relative paths resolve against the
    /// working directory.
    #[arg(long, env = "ACCOUNT_PATH", default_value = DEFAULT_ACCOUNT_PATH)]
    pub account_path: String,

    /// TCP port to listen on
    #[arg(long, env = "HTTP_PORT", default_value_t = DEFAULT_HTTP_PORT, value_parser = parse_port)]
    pub http_port: u16,

    /// Address to bind
    #[arg(long, env = "HTTP_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub http_host: IpAddr,

    /// Seconds in-flight requests may run after a shutdown signal
    #[arg(long, env = "SHUTDOWN_GRACE_SECS", default_value_t = 5)]
    pub shutdown_grace_secs: u64,
}

impl Config {
    /// Storage root; an empty `ACCOUNT_PATH` means the default.
    pub fn storage_root(&self) -> PathBuf {
        if self.account_path.is_empty() {
            PathBuf::from(DEFAULT_ACCOUNT_PATH)
        } else {
            PathBuf::from(&self.account_path)
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http_host, self.http_port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

// An empty value (e.g. `HTTP_PORT=`) means the default port.
fn parse_port(raw: &str) -> Result<u16, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_HTTP_PORT);
    }
    raw.parse()
        .map_err(|err| format!("invalid port {raw:?}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "account-ledger",
            "--account-path",
            "/var/lib/ledger",
            "--http-port",
            "9090",
            "--http-host",
            "127.0.0.1",
            "--shutdown-grace-secs",
            "2",
        ])
        .unwrap();

        assert_eq!(config.storage_root(), PathBuf::from("/var/lib/ledger"));
        assert_eq!(config.listen_addr(), "127.0.0.1:9090".parse().unwrap());
        assert_eq!(config.shutdown_grace(), Duration::from_secs(2));
    }

    #[test]
    fn empty_account_path_falls_back_to_default() {
        let config =
            Config::try_parse_from(["account-ledger", "--account-path", ""]).unwrap();
        assert_eq!(config.storage_root(), PathBuf::from("accounts"));
    }

    #[test]
    fn empty_port_falls_back_to_default() {
        let config = Config::try_parse_from(["account-ledger", "--http-port", ""]).unwrap();
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn rejects_invalid_port() {
        let result = Config::try_parse_from(["account-ledger", "--http-port", "70000"]);
        assert!(result.is_err());
    }
}
