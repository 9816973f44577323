//! Scripted in-memory CI server shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use ciprobe_common::{ArtifactEntry, ChangeSet, StatusDocument, WaitConfig};
use ciprobe_e2e::{E2eError, E2eResult, Job, Navigator, Session, StatusSource};

/// One scripted answer of the status endpoint
#[derive(Debug, Clone)]
pub enum Reply {
    NotFound,
    Unavailable,
    Doc(StatusDocument),
}

pub fn building(number: u64) -> Reply {
    Reply::Doc(doc(number, true, None))
}

pub fn finished(number: u64, result: &str) -> Reply {
    Reply::Doc(doc(number, false, Some(result)))
}

pub fn doc(number: u64, building: bool, result: Option<&str>) -> StatusDocument {
    StatusDocument {
        number,
        building,
        result: result.map(str::to_string),
        built_on: Some(String::new()),
        timestamp: None,
        duration: None,
        full_display_name: None,
        artifacts: Vec::new(),
        change_set: None,
        change_sets: Vec::new(),
    }
}

pub fn with_artifacts(mut doc: StatusDocument, paths: &[&str]) -> StatusDocument {
    doc.artifacts = paths
        .iter()
        .map(|path| ArtifactEntry {
            file_name: path.rsplit('/').next().unwrap().to_string(),
            relative_path: path.to_string(),
            display_path: None,
        })
        .collect();
    doc
}

pub fn with_changes(mut doc: StatusDocument, change_set: ChangeSet) -> StatusDocument {
    doc.change_set = Some(change_set);
    doc
}

/// Replies are consumed in order; the last one repeats forever.
pub struct ScriptedServer {
    replies: Mutex<VecDeque<Reply>>,
    fetches: AtomicUsize,
    visits: Mutex<Vec<String>>,
    pages: Mutex<Vec<(String, String)>>,
}

impl ScriptedServer {
    pub fn new(script: Vec<Reply>) -> Arc<Self> {
        assert!(!script.is_empty(), "script needs at least one reply");
        Arc::new(Self {
            replies: Mutex::new(script.into()),
            fetches: AtomicUsize::new(0),
            visits: Mutex::new(Vec::new()),
            pages: Mutex::new(Vec::new()),
        })
    }

    /// Replace the remaining script
    pub fn reconfigure(&self, script: Vec<Reply>) {
        *self.replies.lock().unwrap() = script.into();
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }

    /// Serve `body` for any text read whose URL ends with `suffix`
    pub fn serve_text(&self, suffix: &str, body: &str) {
        self.pages
            .lock()
            .unwrap()
            .push((suffix.to_string(), body.to_string()));
    }
}

#[async_trait]
impl StatusSource for ScriptedServer {
    async fn fetch_status(&self, location: &Url) -> E2eResult<StatusDocument> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                replies.front().cloned().unwrap()
            }
        };
        let url = format!("{}api/json", location);
        match reply {
            Reply::NotFound => Err(E2eError::NotFound { url }),
            Reply::Unavailable => Err(E2eError::UnexpectedStatus { url, status: 503 }),
            Reply::Doc(doc) => Ok(doc),
        }
    }
}

#[async_trait]
impl Navigator for ScriptedServer {
    async fn visit(&self, url: &Url) -> E2eResult<()> {
        self.visits.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn read_text(&self, url: &Url) -> E2eResult<String> {
        let pages = self.pages.lock().unwrap();
        pages
            .iter()
            .find(|(suffix, _)| url.as_str().ends_with(suffix.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| E2eError::NotFound { url: url.to_string() })
    }
}

pub fn wait_config() -> WaitConfig {
    WaitConfig {
        start_timeout_secs: 0,
        finish_timeout_secs: 120,
        poll_interval_secs: 1,
    }
}

pub fn session(server: &Arc<ScriptedServer>) -> Session {
    Session::new(
        Url::parse("http://ci.test/").unwrap(),
        server.clone(),
        server.clone(),
        wait_config(),
    )
}

pub fn job(server: &Arc<ScriptedServer>) -> Job {
    session(server).job("app").unwrap()
}
