//! fleet-issues create-issue command

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use fleet_adapter::controller::{Headers, IssueController};
use fleet_adapter::messaging::OutboxPublisher;
use fleet_adapter::repository::InMemoryIssueRepository;
use fleet_usecase::IssueService;
use serde_json::json;
use shared::ServiceConfig;
use tracing::warn;

use crate::wiring::{session_gateway, App, SESSION_TOKEN};

const ISSUES_PATH: &str = "/api/v1/issues";

#[derive(Debug, Args)]
pub struct CreateIssueCommand {
    /// JSON-lines event log to build the index from
    #[arg(short, long)]
    pub events: Option<PathBuf>,

    /// Caller's user id
    #[arg(short, long)]
    pub user_id: i64,

    /// Caller's roles (comma-separated)
    #[arg(short, long, default_value = "ROLE_CARRIER")]
    pub roles: String,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub content: String,

    /// VEHICLE, ROUTE, SHIPMENT, TECHNICAL or OTHER
    #[arg(short = 't', long = "type")]
    pub issue_type: String,

    #[arg(long)]
    pub shipment_id: Option<i64>,
}

impl CreateIssueCommand {
    pub async fn run(&self, config: &ServiceConfig) -> anyhow::Result<()> {
        let app = App::new(config);
        if let Some(events) = &self.events {
            app.ingest(events).await?;
        }

        let gateway = session_gateway(config, self.user_id, &self.roles)?;
        let authorization = format!("Bearer {}", SESSION_TOKEN);
        let identity = match gateway.admit(ISSUES_PATH, Some(&authorization)) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(status = e.status(), error = %e, "Gateway rejected request");
                bail!("{} ({})", e, e.status());
            }
        };

        let headers = identity
            .headers()
            .into_iter()
            .fold(Headers::new(), |headers, (name, value)| headers.with(name, value));

        let outbox = OutboxPublisher::new();
        let service = IssueService::new(
            app.index().clone(),
            InMemoryIssueRepository::new(),
            outbox.clone(),
        );
        let mut controller = IssueController::new(service);

        let body = json!({
            "title": self.title,
            "content": self.content,
            "type": self.issue_type,
            "shipmentId": self.shipment_id,
        });
        let response = controller.create(&headers, &body.to_string());

        println!("{}", serde_json::to_string_pretty(&response.body)?);
        for message in outbox.drain() {
            println!("{}", message);
        }

        if !response.is_success() {
            bail!("Issue rejected with status {}", response.status);
        }
        Ok(())
    }
}
