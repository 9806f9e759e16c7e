//! CLI help output specs

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_zero() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn help_lists_subcommands() {
    cli().args(&["--help"]).passes().stdout_has("submit").stdout_has("status");
}

#[test]
fn submit_help_lists_job_flags() {
    cli()
        .args(&["submit", "--help"])
        .passes()
        .stdout_has("--mqconfig")
        .stdout_has("--jobname")
        .stdout_has("--department")
        .stdout_has("--email")
        .stdout_has("--connect")
        .stdout_has("--expedite");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn unknown_subcommand_exits_one() {
    cli().args(&["launch"]).fails().stderr_has("Usage:");
}
