//! `mqsubmit submit` specs against the local backend

use crate::prelude::*;

#[test]
fn missing_required_flags_exit_one() {
    cli()
        .args(&["submit", "-m", "mqpar.xml", "-n", "run1"])
        .fails()
        .stderr_has("--department")
        .stderr_has("--email");
}

#[test]
fn missing_configuration_file_exits_one() {
    let job = JobDir::new();
    job.remove("job/mqpar.xml");
    job.submit("run1", &[]).fails().stderr_has("configuration file not found");
    assert!(!job.exists("store"));
}

#[test]
fn missing_inputs_are_listed_and_nothing_is_published() {
    let job = JobDir::new();
    job.remove("job/b.raw");
    job.remove("job/human.fasta");

    job.submit("run1", &[]).fails().stderr_has("b.raw").stderr_has("human.fasta");
    assert!(!job.exists("store/acme-run1"));
}

#[test]
fn invalid_email_exits_one() {
    let job = JobDir::new();
    job.mqsubmit()
        .args(&["submit", "-m", &job.config(), "-n", "run1", "-d", "acme", "-e", "nobody"])
        .fails()
        .stderr_has("not an email address");
}

#[test]
fn submission_publishes_job_folder_and_spools_worker() {
    let job = JobDir::new();
    job.submit("run1", &[])
        .passes()
        .stdout_has("Submitted acme-run1 (c4.xlarge, 3 thread(s), 151 GB volume)")
        .stdout_has("user@example.org")
        .stdout_lacks("Password:");

    for file in ["a.raw", "b.raw", "c.raw", "human.fasta", "mqpar.xml"] {
        assert!(job.exists(&format!("store/acme-run1/{file}")), "{file} not published");
    }
    assert_eq!(job.read("store/acme-run1/jobCtrl/jobinfo.txt"), "run1,acme,user@example.org");
    assert_eq!(job.read("store/acme-run1/jobCtrl/ready.txt"), "ready");
    assert!(!job.exists("store/acme-run1/jobCtrl/running.txt"));
    assert!(job
        .read("store/acme-run1/jobCtrl/resultsUrl.txt")
        .ends_with("maxquant-acme-run1-results-combined.zip"));

    let config = job.read("store/acme-run1/mqpar.xml");
    assert!(config.contains(r"C:\mq-job\a.raw"));
    assert!(config.contains("<numThreads>3</numThreads>"));

    let spooled: serde_json::Value =
        serde_json::from_str(&job.read("spool/maxquant-acme-run1.json")).unwrap();
    assert_eq!(spooled["compute_class"], "c4.xlarge");
    assert_eq!(spooled["volume_size_gb"], 151);
    assert!(job.read("spool/maxquant-acme-run1.user-data").starts_with("<powershell>"));
}

#[test]
fn resubmitting_the_same_job_is_rejected() {
    let job = JobDir::new();
    job.submit("run1", &[]).passes();
    job.submit("run1", &[]).fails().stderr_has("already a job named 'acme-run1'");
    job.submit("run2", &[]).passes().stdout_has("Submitted acme-run2");
}

#[test]
fn connect_prints_worker_login() {
    let job = JobDir::new();
    job.submit("run1", &["--connect"])
        .passes()
        .stdout_has("Username: Administrator")
        .stdout_has("Password: ");
}

#[test]
fn custom_side_files_are_published() {
    let job = JobDir::new();
    std::fs::write(job.path("job/modifications.xml"), "<modifications/>").unwrap();
    job.submit("run1", &[]).passes();
    assert_eq!(job.read("store/acme-run1/modifications.xml"), "<modifications/>");
}
