//! Status Command

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use ciprobe_common::StatusDocument;
use ciprobe_e2e::Session;

use super::BuildArgs;
use crate::output::{print_item, print_warning, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: BuildArgs,
}

/// One-row view of a status document
#[derive(Serialize)]
pub struct BuildSummary {
    pub job: String,
    pub number: u64,
    pub state: &'static str,
    pub result: Option<String>,
    pub node: String,
    pub started: Option<String>,
    pub duration_secs: Option<f64>,
}

impl BuildSummary {
    pub fn new(job: &str, doc: &StatusDocument) -> Self {
        let state = if doc.building {
            "building"
        } else if doc.in_progress() {
            "stopping"
        } else {
            "finished"
        };
        Self {
            job: job.to_string(),
            number: doc.number,
            state,
            result: doc.result.clone(),
            node: doc.executor_node().to_string(),
            started: doc.started_at().map(|t| t.to_rfc3339()),
            duration_secs: doc
                .duration
                .filter(|ms| *ms > 0)
                .map(|ms| ms as f64 / 1000.0),
        }
    }
}

impl TableDisplay for BuildSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Job", "Number", "State", "Result", "Node", "Started", "Duration"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.job.clone(),
            self.number.to_string(),
            self.state.to_string(),
            self.result.clone().unwrap_or_else(|| "-".into()),
            self.node.clone(),
            self.started.clone().unwrap_or_else(|| "-".into()),
            self.duration_secs
                .map(|s| format!("{:.1}s", s))
                .unwrap_or_else(|| "-".into()),
        ]
    }
}

pub async fn execute(args: StatusArgs, session: &Session, format: OutputFormat) -> Result<()> {
    let build = args.target.open(session)?;

    match build.status().await {
        Ok(doc) => print_item(&BuildSummary::new(build.job().name(), &doc), format),
        Err(e) if e.is_not_found() => {
            print_warning(&format!("{} has not started", build));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
