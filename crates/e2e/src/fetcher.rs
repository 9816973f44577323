//! Collaborator seams: status reads and page navigation

use async_trait::async_trait;
use url::Url;

use ciprobe_common::StatusDocument;

use crate::error::{E2eError, E2eResult};

/// Reads the structured status document of a remote build.
///
/// One call is one round trip; implementations do not retry. A missing
/// resource is reported as [`E2eError::NotFound`], everything else that goes
/// wrong is transient (see [`E2eError::is_transient`]).
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, location: &Url) -> E2eResult<StatusDocument>;
}

/// The page-level side of a session: visiting views and reading plain text.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Open a page the way an interactive session would
    async fn visit(&self, url: &Url) -> E2eResult<()>;

    /// Read a page as plain text
    async fn read_text(&self, url: &Url) -> E2eResult<String>;
}

/// Fetch a status document, turning "not found" into `None`
pub async fn probe(source: &dyn StatusSource, location: &Url) -> E2eResult<Option<StatusDocument>> {
    match source.fetch_status(location).await {
        Ok(doc) => Ok(Some(doc)),
        Err(E2eError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
