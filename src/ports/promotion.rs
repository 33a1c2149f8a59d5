//! Promotion Collaborator Adapters
//!
//! Production implementations of the failover collaborators: telling a
//! replica to leave recovery (`pg_promote`), checking whether it did
//! (`pg_is_in_recovery`), and repointing the external reverse proxy.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::{GatewayError, Result};
use crate::ports::postgres::connect_node;
use crate::ports::{ProxyControl, ReplicaPromoter};

// == Pg Promoter ==

/// Drives promotion through PostgreSQL's own interface.
pub struct PgPromoter {
    call_timeout: Duration,
}

impl PgPromoter {
    pub fn new(call_timeout: Duration) -> Self {
        Self { call_timeout }
    }
}

#[async_trait]
impl ReplicaPromoter for PgPromoter {
    async fn promote(&self, address: &str) -> Result<()> {
        let call = async {
            let conn = connect_node(address).await?;
            // Non-blocking form; completion is observed via confirm_writable.
            conn.client
                .query_one("SELECT pg_promote(false)", &[])
                .await
                .map_err(|e| {
                    GatewayError::Unavailable(format!("pg_promote on {}: {}", address, e))
                })?;
            Ok(())
        };
        match timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Unavailable(format!(
                "pg_promote on {} timed out",
                address
            ))),
        }
    }

    async fn confirm_writable(&self, address: &str) -> Result<bool> {
        let call = async {
            let conn = connect_node(address).await?;
            let row = conn
                .client
                .query_one("SELECT pg_is_in_recovery()", &[])
                .await
                .map_err(|e| {
                    GatewayError::Unavailable(format!("recovery check on {}: {}", address, e))
                })?;
            let in_recovery: bool = row.get(0);
            Ok(!in_recovery)
        };
        match timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Unavailable(format!(
                "recovery check on {} timed out",
                address
            ))),
        }
    }
}

// == Proxy Control ==

/// Repoints the proxy by running a configured command (typically a script
/// that rewrites the proxy configuration and reloads it). The promoted
/// address is appended as the final argument.
pub struct CommandProxyControl {
    command: String,
}

impl CommandProxyControl {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl ProxyControl for CommandProxyControl {
    async fn repoint(&self, address: &str) -> Result<()> {
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .arg("repoint")
            .arg(address)
            .output()
            .await
            .map_err(|e| GatewayError::Promotion(format!("repoint command failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GatewayError::Promotion(format!(
                "repoint command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        info!(address, "proxy repointed at new primary");
        Ok(())
    }
}

/// Used when no repoint command is configured (single-node labs, tests
/// against a proxy that is managed by hand). Logs loudly and succeeds.
pub struct LogOnlyProxyControl;

#[async_trait]
impl ProxyControl for LogOnlyProxyControl {
    async fn repoint(&self, address: &str) -> Result<()> {
        warn!(
            address,
            "no PROXY_REPOINT_CMD configured; proxy must be repointed manually"
        );
        Ok(())
    }
}
