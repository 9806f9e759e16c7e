// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing text for `submit` and `status`.

use clap::ValueEnum;
use mq_engine::{JobStatus, SubmissionReceipt};
use std::fmt::Write;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Account used for remote desktop on the worker
pub const WORKER_USER: &str = "Administrator";

/// Summary printed after a successful submission. With `connect`, adds the
/// worker's address and login so the user can watch the job.
pub fn format_receipt(receipt: &SubmissionReceipt, connect: bool, remote_job_dir: &str) -> String {
    let mut out = String::new();
    let sizing = &receipt.sizing;
    let _ = writeln!(
        out,
        "Submitted {} ({}, {} thread(s), {} GB volume)",
        receipt.layout.folder(),
        sizing.compute_class,
        sizing.threads,
        sizing.volume_size_gb()
    );
    let _ = writeln!(out, "Worker: {}", receipt.instance.id);
    let _ = writeln!(
        out,
        "An email will be sent to {} when the job completes, with a link to download the results.",
        receipt.contact
    );

    if connect {
        let server = receipt.instance.private_ip.as_deref().unwrap_or("(address not yet assigned)");
        let _ = writeln!(out);
        let _ = writeln!(out, "Remote desktop into the worker to watch progress (do not interrupt the job):");
        let _ = writeln!(out, "\tServer: {server}");
        let _ = writeln!(out, "\tUsername: {WORKER_USER}");
        let _ = writeln!(out, "\tDomain: None - leave blank");
        let _ = writeln!(out, "\tPassword: {}", receipt.credential.expose());
        let _ = writeln!(out, "\tStatus files: {}", status_files(remote_job_dir));
    }
    out
}

/// MaxQuant's progress files under the worker job directory
fn status_files(remote_job_dir: &str) -> String {
    let sep = if remote_job_dir.contains('\\') { '\\' } else { '/' };
    let dir = remote_job_dir.trim_end_matches(sep);
    format!("{dir}{sep}combined{sep}proc{sep}*")
}

pub fn format_status(status: &JobStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Job: {}", status.folder);
    if !status.registered {
        let _ = writeln!(out, "Stage: not submitted");
        return out;
    }
    let stage = match status.flag {
        Some(flag) => flag.to_string(),
        None => "submitted, waiting for worker".to_string(),
    };
    let _ = writeln!(out, "Stage: {stage}");
    let _ = writeln!(out, "Objects: {}", status.objects);
    if let Some(url) = &status.results_url {
        let _ = writeln!(out, "Results: {url}");
    }
    out
}

pub fn format_status_json(status: &JobStatus) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(status)?)
}
