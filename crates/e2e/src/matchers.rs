//! Assertions over builds
//!
//! Failures carry the build's console log so a red CI run can be diagnosed
//! without re-running it.

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use tracing::warn;

use ciprobe_common::Outcome;

use crate::build::Build;
use crate::error::{E2eError, E2eResult};
use crate::fetcher::probe;

/// A composable check against a build
#[async_trait]
pub trait BuildMatcher: Send + Sync {
    fn describe(&self) -> String;

    async fn check(&self, build: &Build) -> E2eResult<()>;
}

/// Console text for a failure message; a failed read must not hide the mismatch
async fn console_for_diagnostics(build: &Build) -> String {
    match build.console().await {
        Ok(text) => text,
        Err(e) => format!("<console unavailable: {}>", e),
    }
}

async fn display_name(build: &Build) -> String {
    build.describe().await.unwrap_or_else(|_| build.to_string())
}

/// Matches when the build finished with `expected`.
///
/// Waits for the build to finish, like [`Build::outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultIs(pub Outcome);

#[async_trait]
impl BuildMatcher for ResultIs {
    fn describe(&self) -> String {
        format!("build result {}", self.0)
    }

    async fn check(&self, build: &Build) -> E2eResult<()> {
        let actual = build.outcome().await?;
        if actual == self.0 {
            return Ok(());
        }

        let name = display_name(build).await;
        warn!(build = %name, expected = %self.0, %actual, "unexpected build result");
        Err(E2eError::OutcomeMismatch {
            build: name,
            expected: self.0,
            actual,
            console: console_for_diagnostics(build).await,
        })
    }
}

/// Multi-line regex match against the console log
#[derive(Debug, Clone)]
pub struct ConsoleMatches {
    pattern: Regex,
    expect_match: bool,
}

impl ConsoleMatches {
    pub fn contains(pattern: &str) -> E2eResult<Self> {
        Ok(Self {
            pattern: RegexBuilder::new(pattern).multi_line(true).build()?,
            expect_match: true,
        })
    }

    pub fn lacks(pattern: &str) -> E2eResult<Self> {
        Ok(Self {
            expect_match: false,
            ..Self::contains(pattern)?
        })
    }

    fn expectation(&self) -> &'static str {
        if self.expect_match {
            "does not match"
        } else {
            "unexpectedly matches"
        }
    }
}

#[async_trait]
impl BuildMatcher for ConsoleMatches {
    fn describe(&self) -> String {
        let verb = if self.expect_match { "matches" } else { "does not match" };
        format!("console output {} /{}/", verb, self.pattern.as_str())
    }

    async fn check(&self, build: &Build) -> E2eResult<()> {
        let console = build.console().await?;
        if self.pattern.is_match(&console) == self.expect_match {
            return Ok(());
        }
        Err(E2eError::ConsoleMismatch {
            build: display_name(build).await,
            expectation: self.expectation(),
            pattern: self.pattern.as_str().to_string(),
            console,
        })
    }
}

/// All inner matchers must pass; the first failure is returned.
pub struct AllOf(pub Vec<Box<dyn BuildMatcher>>);

#[async_trait]
impl BuildMatcher for AllOf {
    fn describe(&self) -> String {
        self.0
            .iter()
            .map(|m| m.describe())
            .collect::<Vec<_>>()
            .join(" and ")
    }

    async fn check(&self, build: &Build) -> E2eResult<()> {
        for matcher in &self.0 {
            matcher.check(build).await?;
        }
        Ok(())
    }
}

impl Build {
    pub async fn should(&self, matcher: &dyn BuildMatcher) -> E2eResult<&Self> {
        matcher.check(self).await?;
        Ok(self)
    }

    pub async fn should_be(&self, outcome: Outcome) -> E2eResult<&Self> {
        self.should(&ResultIs(outcome)).await
    }

    pub async fn should_succeed(&self) -> E2eResult<&Self> {
        self.should_be(Outcome::Success).await
    }

    pub async fn should_fail(&self) -> E2eResult<&Self> {
        self.should_be(Outcome::Failure).await
    }

    pub async fn should_abort(&self) -> E2eResult<&Self> {
        self.should_be(Outcome::Aborted).await
    }

    pub async fn should_be_unstable(&self) -> E2eResult<&Self> {
        self.should_be(Outcome::Unstable).await
    }

    pub async fn should_contain_console_output(&self, pattern: &str) -> E2eResult<&Self> {
        self.should(&ConsoleMatches::contains(pattern)?).await
    }

    pub async fn should_not_contain_console_output(&self, pattern: &str) -> E2eResult<&Self> {
        self.should(&ConsoleMatches::lacks(pattern)?).await
    }

    /// The server knows this build
    pub async fn should_exist(&self) -> E2eResult<&Self> {
        let source = self.job().session().status_source();
        match probe(source, self.location()).await? {
            Some(_) => Ok(self),
            None => Err(E2eError::Existence {
                url: self.location().to_string(),
                reason: "expected the build to exist but the server returned 404".into(),
            }),
        }
    }

    /// The server answers 404 for this build
    pub async fn should_not_exist(&self) -> E2eResult<&Self> {
        let source = self.job().session().status_source();
        match probe(source, self.location()).await? {
            None => Ok(self),
            Some(doc) => Err(E2eError::Existence {
                url: self.location().to_string(),
                reason: format!("expected a 404 but found build #{}", doc.number),
            }),
        }
    }
}
