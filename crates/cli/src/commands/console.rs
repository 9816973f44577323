//! Console Commands

use anyhow::Result;
use clap::Args;

use ciprobe_e2e::{E2eError, Session};

use super::BuildArgs;
use crate::output::{print_error, print_success};

#[derive(Args)]
pub struct ConsoleArgs {
    #[command(flatten)]
    pub target: BuildArgs,

    /// Only check that the log matches this multi-line regex
    #[arg(long, conflicts_with = "lacks")]
    pub contains: Option<String>,

    /// Only check that the log does not match this multi-line regex
    #[arg(long)]
    pub lacks: Option<String>,

    /// Just print the console URL
    #[arg(short, long)]
    pub url_only: bool,
}

/// Returns `false` when a `--contains`/`--lacks` check failed
pub async fn execute(args: ConsoleArgs, session: &Session) -> Result<bool> {
    let build = args.target.open(session)?;

    if args.url_only {
        println!("{}", build.console_url()?);
        return Ok(true);
    }

    let checked = match (&args.contains, &args.lacks) {
        (Some(pattern), _) => build.should_contain_console_output(pattern).await,
        (None, Some(pattern)) => build.should_not_contain_console_output(pattern).await,
        (None, None) => {
            print!("{}", build.console().await?);
            return Ok(true);
        }
    };

    match checked {
        Ok(_) => {
            print_success(&format!("console of {} passed the check", build));
            Ok(true)
        }
        Err(e @ E2eError::ConsoleMismatch { .. }) => {
            print_error(&e.to_string());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
