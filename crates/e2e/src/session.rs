//! Session: base URL, collaborators and wait defaults shared by every handle

use std::sync::Arc;
use std::time::Duration;
use url::Url;

use ciprobe_common::{HarnessConfig, WaitConfig};

use crate::client::HttpClient;
use crate::error::{E2eError, E2eResult};
use crate::fetcher::{Navigator, StatusSource};
use crate::identity::as_container;
use crate::job::Job;
use crate::poller::PollSettings;

/// Cheap to clone; every job and build keeps its own copy.
#[derive(Clone)]
pub struct Session {
    base_url: Url,
    status: Arc<dyn StatusSource>,
    navigator: Arc<dyn Navigator>,
    wait: WaitConfig,
}

impl Session {
    pub fn new(
        base_url: Url,
        status: Arc<dyn StatusSource>,
        navigator: Arc<dyn Navigator>,
        wait: WaitConfig,
    ) -> Self {
        Self {
            base_url: as_container(base_url),
            status,
            navigator,
            wait,
        }
    }

    /// HTTP session against `config.base_url`
    pub fn connect(config: &HarnessConfig) -> E2eResult<Self> {
        config.validate().map_err(E2eError::Config)?;
        let base_url = Url::parse(&config.base_url)?;
        let client = Arc::new(HttpClient::new(&config.http)?);
        Ok(Self::new(base_url, client.clone(), client, config.wait))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn status_source(&self) -> &dyn StatusSource {
        self.status.as_ref()
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub fn wait_config(&self) -> &WaitConfig {
        &self.wait
    }

    /// Poll settings for `timeout` at the configured cadence
    pub fn poll_settings(&self, timeout: Duration) -> PollSettings {
        PollSettings::new(timeout, self.wait.poll_interval())
    }

    /// Handle for a job; `/` in `name` separates folders
    pub fn job(&self, name: &str) -> E2eResult<Job> {
        Job::new(self.clone(), name)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}
