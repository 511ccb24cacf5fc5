//! fleet-issues replay command

use std::path::PathBuf;

use clap::Args;
use fleet_domain::CarrierId;
use serde_json::json;
use shared::ServiceConfig;

use crate::wiring::App;

#[derive(Debug, Args)]
pub struct ReplayCommand {
    /// JSON-lines event log
    #[arg(short, long)]
    pub events: PathBuf,

    /// Carriers to resolve after the replay
    #[arg(long = "carrier")]
    pub carriers: Vec<i64>,
}

impl ReplayCommand {
    pub async fn run(&self, config: &ServiceConfig) -> anyhow::Result<()> {
        let app = App::new(config);
        let summary = app.ingest(&self.events).await?;
        let stats = app.index().stats();

        let resolutions: Vec<_> = self
            .carriers
            .iter()
            .map(|&id| {
                let carrier = CarrierId::new(id);
                json!({
                    "carrierId": id,
                    "managerId": app.index().manager_for_carrier(carrier).map(|m| m.get()),
                    "vehicleId": app.index().vehicle_for_carrier(carrier).map(|v| v.get()),
                })
            })
            .collect();

        let report = json!({
            "applied": summary.applied,
            "dropped": summary.dropped,
            "identityEventsIgnored": stats.identity_events_ignored,
            "invariantViolations": stats.invariant_violations,
            "carriers": resolutions,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}
