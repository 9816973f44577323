//! Build lifecycle tests against a scripted status endpoint
//!
//! All tests run on a paused clock, so poll sleeps cost no wall time and
//! elapsed durations are exact.

mod support;

use std::time::Duration;
use tokio::time::Instant;

use ciprobe_e2e::{E2eError, Outcome, Permalink};
use support::{building, finished, job, Reply, ScriptedServer};

#[tokio::test(start_paused = true)]
async fn cached_outcome_short_circuits_progress_checks() {
    let server = ScriptedServer::new(vec![finished(4, "SUCCESS")]);
    let build = job(&server).build(4).unwrap();

    assert_eq!(build.outcome().await.unwrap(), Outcome::Success);
    let fetches = server.fetch_count();

    assert!(!build.is_in_progress().await.unwrap());
    assert!(build.has_started().await.unwrap());
    assert_eq!(build.cached_outcome(), Some(Outcome::Success));
    assert_eq!(server.fetch_count(), fetches);
}

#[tokio::test(start_paused = true)]
async fn zero_budget_start_wait_on_missing_build_times_out_after_one_probe() {
    let server = ScriptedServer::new(vec![Reply::NotFound]);
    let build = job(&server).build(1).unwrap();

    let err = build.wait_until_started().await.unwrap_err();
    match err {
        E2eError::Timeout { budget, elapsed, .. } => {
            assert_eq!(budget, Duration::ZERO);
            assert_eq!(elapsed, Duration::ZERO);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(server.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn finished_wait_is_idempotent() {
    let server = ScriptedServer::new(vec![finished(2, "FAILURE")]);
    let build = job(&server).build(2).unwrap();

    build.wait_until_finished().await.unwrap();
    let after_first = server.fetch_count();

    build.wait_until_finished().await.unwrap();
    assert_eq!(server.fetch_count(), after_first);
    assert_eq!(build.cached_outcome(), Some(Outcome::Failure));
}

#[tokio::test(start_paused = true)]
async fn outcome_stays_cached_after_remote_changes() {
    let server = ScriptedServer::new(vec![finished(3, "UNSTABLE")]);
    let build = job(&server).build(3).unwrap();

    assert_eq!(build.outcome().await.unwrap(), Outcome::Unstable);
    let fetches = server.fetch_count();

    server.reconfigure(vec![finished(3, "SUCCESS")]);
    assert_eq!(build.outcome().await.unwrap(), Outcome::Unstable);
    assert_eq!(build.try_outcome().await.unwrap(), Some(Outcome::Unstable));
    assert!(build.is_unstable().await.unwrap());
    assert_eq!(server.fetch_count(), fetches);
}

#[tokio::test(start_paused = true)]
async fn start_wait_polls_through_not_found() {
    let server = ScriptedServer::new(vec![
        Reply::NotFound,
        Reply::NotFound,
        Reply::NotFound,
        building(8),
    ]);
    let build = job(&server).build(8).unwrap();

    let start = Instant::now();
    build
        .wait_until_started_within(Duration::from_secs(10))
        .await
        .unwrap();

    assert_eq!(server.fetch_count(), 4);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn finish_wait_polls_until_result_then_serves_cache() {
    let mut script: Vec<Reply> = (0..5).map(|_| building(11)).collect();
    script.push(finished(11, "SUCCESS"));
    let server = ScriptedServer::new(script);
    let build = job(&server).build(11).unwrap();

    build
        .wait_until_finished_within(Duration::from_secs(120))
        .await
        .unwrap();
    assert_eq!(server.fetch_count(), 6);

    assert_eq!(build.outcome().await.unwrap(), Outcome::Success);
    assert!(build.is_success().await.unwrap());
    assert_eq!(server.fetch_count(), 6);
}

#[tokio::test(start_paused = true)]
async fn finish_wait_times_out_with_elapsed_and_budget() {
    let server = ScriptedServer::new(vec![building(5)]);
    let build = job(&server).build(5).unwrap();

    let err = build
        .wait_until_finished_within(Duration::from_secs(3))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    match err {
        E2eError::Timeout { elapsed, budget, condition } => {
            assert_eq!(elapsed, Duration::from_secs(3));
            assert_eq!(budget, Duration::from_secs(3));
            assert!(condition.contains("app #5"), "{condition}");
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(build.cached_outcome(), None);
}

#[tokio::test(start_paused = true)]
async fn transient_errors_are_not_treated_as_not_started() {
    let server = ScriptedServer::new(vec![Reply::Unavailable]);
    let build = job(&server).build(1).unwrap();

    let err = build.has_started().await.unwrap_err();
    assert!(err.is_transient());

    let err = build
        .wait_until_started_within(Duration::from_secs(30))
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert_eq!(server.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn stopped_without_result_still_counts_as_in_progress() {
    let server = ScriptedServer::new(vec![
        Reply::Doc(support::doc(6, false, None)),
        finished(6, "ABORTED"),
    ]);
    let build = job(&server).build(6).unwrap();

    assert!(build.is_in_progress().await.unwrap());
    assert!(!build.is_in_progress().await.unwrap());
    assert_eq!(build.cached_outcome(), Some(Outcome::Aborted));
}

#[tokio::test(start_paused = true)]
async fn not_started_build_is_not_in_progress() {
    let server = ScriptedServer::new(vec![Reply::NotFound]);
    let build = job(&server).build(6).unwrap();

    assert!(!build.has_started().await.unwrap());
    assert!(!build.is_in_progress().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn unknown_result_is_fatal() {
    let server = ScriptedServer::new(vec![finished(9, "KINDA_OK")]);
    let build = job(&server).build(9).unwrap();

    let err = build.outcome().await.unwrap_err();
    assert!(matches!(err, E2eError::UnknownOutcome(ref v) if v == "KINDA_OK"));
}

#[tokio::test(start_paused = true)]
async fn try_outcome_never_waits() {
    let server = ScriptedServer::new(vec![building(2), finished(2, "NOT_BUILT")]);
    let build = job(&server).build(2).unwrap();

    let start = Instant::now();
    assert_eq!(build.try_outcome().await.unwrap(), None);
    assert_eq!(build.try_outcome().await.unwrap(), Some(Outcome::NotBuilt));
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(server.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn outcome_blocks_until_finished() {
    let server = ScriptedServer::new(vec![
        building(7),
        building(7),
        building(7),
        finished(7, "SUCCESS"),
    ]);
    let build = job(&server).build(7).unwrap();

    let start = Instant::now();
    assert_eq!(build.outcome().await.unwrap(), Outcome::Success);
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn number_is_read_fresh_each_time() {
    let server = ScriptedServer::new(vec![finished(21, "SUCCESS")]);
    let build = job(&server).build(Permalink::LastBuild).unwrap();

    assert_eq!(build.number().await.unwrap(), 21);
    assert_eq!(build.number().await.unwrap(), 21);
    assert_eq!(server.fetch_count(), 2);
    assert_eq!(build.describe().await.unwrap(), "app #21");
    assert_eq!(
        build.status_url().await.unwrap().as_str(),
        "http://ci.test/job/app/21/"
    );
}

#[tokio::test(start_paused = true)]
async fn permalink_and_number_handles_are_the_same_build() {
    let server = ScriptedServer::new(vec![finished(21, "SUCCESS")]);
    let app = job(&server);
    let latest = app.last_build().unwrap();
    let numbered = app.build(21).unwrap();

    assert_ne!(latest.id(), numbered.id());
    assert!(latest.same_build(&numbered).await.unwrap());

    let other_job = support::session(&server).job("other").unwrap();
    let foreign = other_job.build(21).unwrap();
    let before = server.fetch_count();
    assert!(!numbered.same_build(&foreign).await.unwrap());
    assert_eq!(server.fetch_count(), before);
}

#[tokio::test(start_paused = true)]
async fn waits_visit_job_and_console_pages() {
    let server = ScriptedServer::new(vec![finished(3, "SUCCESS")]);
    let build = job(&server).build(3).unwrap();

    build.wait_until_finished().await.unwrap();
    assert_eq!(
        server.visits(),
        vec![
            "http://ci.test/job/app/".to_string(),
            "http://ci.test/job/app/3/console".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn node_reports_agent_name() {
    let mut status = support::doc(4, false, Some("SUCCESS"));
    status.built_on = Some("linux-agent".into());
    let server = ScriptedServer::new(vec![Reply::Doc(status)]);
    let build = job(&server).build(4).unwrap();

    assert_eq!(
        build.node().await.unwrap(),
        ciprobe_common::ExecutorNode::Agent("linux-agent".into())
    );
}

#[tokio::test(start_paused = true)]
async fn result_reported_while_building_is_still_in_progress() {
    let server = ScriptedServer::new(vec![
        Reply::Doc(support::doc(5, true, Some("UNSTABLE"))),
        Reply::Doc(support::doc(5, true, Some("UNSTABLE"))),
        Reply::Doc(support::doc(5, true, Some("UNSTABLE"))),
        finished(5, "UNSTABLE"),
    ]);
    let build = job(&server).build(5).unwrap();

    assert!(build.is_in_progress().await.unwrap());
    assert_eq!(build.cached_outcome(), None);

    let start = Instant::now();
    build
        .wait_until_finished_within(Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(1));
    assert_eq!(server.fetch_count(), 4);
    assert_eq!(build.cached_outcome(), Some(Outcome::Unstable));
}
