//! Wait Command

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use ciprobe_common::Outcome;
use ciprobe_e2e::{E2eError, Session};

use super::BuildArgs;
use crate::output::{paint, print_error, print_item, print_success, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct WaitArgs {
    #[command(flatten)]
    pub target: BuildArgs,

    /// Seconds to wait for the build to appear (defaults to the config)
    #[arg(long)]
    pub start_timeout: Option<u64>,

    /// Seconds to wait for the build to finish (defaults to the config)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Fail unless the build ends with this result
    #[arg(long, value_parser = parse_outcome)]
    pub expect: Option<Outcome>,
}

fn parse_outcome(s: &str) -> Result<Outcome, String> {
    s.to_ascii_uppercase()
        .replace('-', "_")
        .parse()
        .map_err(|e: ciprobe_common::Error| e.to_string())
}

#[derive(Serialize)]
pub struct WaitReport {
    pub build: String,
    pub result: Outcome,
    pub waited_secs: f64,
}

impl TableDisplay for WaitReport {
    fn headers() -> Vec<&'static str> {
        vec!["Build", "Result", "Waited"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.build.clone(),
            paint(self.result).to_string(),
            format!("{:.1}s", self.waited_secs),
        ]
    }
}

fn spinner(message: String, format: OutputFormat) -> ProgressBar {
    if format != OutputFormat::Table {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Returns `false` when `--expect` did not match
pub async fn execute(args: WaitArgs, session: &Session, format: OutputFormat) -> Result<bool> {
    let build = args.target.open(session)?;
    let wait = session.wait_config();
    let start_budget = args
        .start_timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| wait.start_timeout());
    let finish_budget = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| wait.finish_timeout());

    let started = Instant::now();
    let bar = spinner(format!("waiting for {}", build), format);
    let waited = async {
        build.wait_until_started_within(start_budget).await?;
        build.wait_until_finished_within(finish_budget).await?;
        build.outcome().await
    }
    .await;
    bar.finish_and_clear();
    let result = waited?;

    let report = WaitReport {
        build: build.describe().await?,
        result,
        waited_secs: started.elapsed().as_secs_f64(),
    };
    info!(build = %report.build, %result, "wait complete");
    print_item(&report, format)?;

    let Some(expected) = args.expect else {
        return Ok(true);
    };
    match build.should_be(expected).await {
        Ok(_) => {
            print_success(&format!("{} ended with {}", report.build, expected));
            Ok(true)
        }
        Err(e @ E2eError::OutcomeMismatch { .. }) => {
            print_error(&e.to_string());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
