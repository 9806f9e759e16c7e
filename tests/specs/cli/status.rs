//! `mqsubmit status` specs against the local backend

use crate::prelude::*;

#[test]
fn unknown_job_is_not_submitted() {
    let job = JobDir::new();
    job.mqsubmit()
        .args(&["status", "-n", "run1", "-d", "acme"])
        .passes()
        .stdout_has("Job: acme-run1")
        .stdout_has("Stage: not submitted");
}

#[test]
fn submitted_job_is_ready() {
    let job = JobDir::new();
    job.submit("run1", &[]).passes();
    job.mqsubmit().args(&["status", "-n", "run1", "-d", "acme"]).passes().stdout_has("Stage: ready");
}

#[test]
fn finished_job_shows_results_link() {
    let job = JobDir::new();
    job.submit("run1", &[]).passes();
    std::fs::remove_file(job.path("store/acme-run1/jobCtrl/ready.txt")).unwrap();
    std::fs::write(job.path("store/acme-run1/jobCtrl/done.txt"), "done").unwrap();

    let outcome = job.mqsubmit().args(&["status", "-n", "run1", "-d", "acme", "-o", "json"]).passes();
    let status: serde_json::Value = serde_json::from_str(&outcome.stdout).unwrap();
    assert_eq!(status["flag"], "done");
    assert_eq!(status["registered"], true);
    assert!(status["results_url"].as_str().unwrap().starts_with("file://"));
}

#[test]
fn missing_explicit_profile_exits_one() {
    cli()
        .args(&["status", "-n", "run1", "-d", "acme", "--profile", "/nonexistent/profile.toml"])
        .fails()
        .stderr_has("cannot read profile");
}
