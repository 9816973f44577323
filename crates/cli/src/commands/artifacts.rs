//! Artifact Commands

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use ciprobe_e2e::{Artifact, Session, ViewKind};

use super::BuildArgs;
use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct ArtifactsArgs {
    #[command(flatten)]
    pub target: BuildArgs,

    /// Print one artifact's content instead of the listing
    #[arg(long, value_name = "RELATIVE_PATH")]
    pub read: Option<String>,
}

#[derive(Serialize)]
pub struct ArtifactRow {
    pub name: String,
    pub path: String,
    pub url: String,
}

impl From<Artifact> for ArtifactRow {
    fn from(artifact: Artifact) -> Self {
        Self {
            name: artifact.name,
            path: artifact.relative_path,
            url: artifact.url.to_string(),
        }
    }
}

impl TableDisplay for ArtifactRow {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Path", "URL"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.path.clone(), self.url.clone()]
    }
}

pub async fn execute(args: ArtifactsArgs, session: &Session, format: OutputFormat) -> Result<()> {
    let view = args.target.open(session)?.resolve(ViewKind::Artifacts);
    let Some(listing) = view.as_artifacts() else {
        anyhow::bail!("{} view does not list artifacts", view.kind());
    };

    if let Some(path) = &args.read {
        print!("{}", listing.read_text(path).await?);
        return Ok(());
    }

    let rows: Vec<ArtifactRow> = listing
        .artifacts()
        .await?
        .into_iter()
        .map(ArtifactRow::from)
        .collect();
    print_list(&rows, format)
}
