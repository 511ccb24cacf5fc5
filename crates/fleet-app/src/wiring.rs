//! Dependency wiring
//!
//! One `RelationshipIndex` per process, shared by `Arc` between the
//! consumer task and request handling.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use fleet_adapter::messaging::{EventConsumer, ReplaySummary};
use fleet_adapter::repository::InMemoryRelationshipStore;
use fleet_domain::RelationshipIndex;
use rbac::{Claims, Gateway, RouteGuard, StaticTokenVerifier};
use shared::{RoleSet, ServiceConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

/// Token the CLI presents to its own gateway
pub const SESSION_TOKEN: &str = "cli-session";

pub struct App {
    index: Arc<RelationshipIndex>,
    consumer: EventConsumer,
    channel_capacity: usize,
}

impl App {
    pub fn new(config: &ServiceConfig) -> Self {
        let store = Arc::new(InMemoryRelationshipStore::new());
        let index = Arc::new(RelationshipIndex::new(store));

        Self {
            consumer: EventConsumer::new(index.clone()),
            index,
            channel_capacity: config.consumer.channel_capacity,
        }
    }

    pub fn index(&self) -> &Arc<RelationshipIndex> {
        &self.index
    }

    /// Stream a JSON-lines file through the consumer task
    pub async fn ingest(&self, path: &Path) -> anyhow::Result<ReplaySummary> {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open event log {}", path.display()))?;

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let task = tokio::spawn(self.consumer.clone().run(rx));

        let mut lines = BufReader::new(file).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if tx.send(line).await.is_err() {
                break;
            }
        }
        drop(tx);

        let summary = task.await.context("Event consumer task failed")?;
        info!(
            applied = summary.applied,
            dropped = summary.dropped,
            "Event log ingested"
        );
        Ok(summary)
    }
}

/// Gateway that admits exactly one caller, presenting [`SESSION_TOKEN`]
pub fn session_gateway(
    config: &ServiceConfig,
    user_id: i64,
    roles: &str,
) -> anyhow::Result<Gateway> {
    let guard = RouteGuard::from_config(&config.gateway.routes)?;
    let verifier =
        StaticTokenVerifier::new().with_token(SESSION_TOKEN, Claims::new(user_id, RoleSet::parse(roles)));

    Ok(Gateway::new(Arc::new(verifier), guard))
}
