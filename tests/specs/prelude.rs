// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness: a `mqsubmit` invocation builder and a job directory
//! fixture wired to the local backend.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Three data files and one FASTA, as MaxQuant writes them on a Windows desktop
pub const MQPAR: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<MaxQuantParams>
   <fastaFiles>
      <string>C:\Users\lab\fasta\human.fasta</string>
   </fastaFiles>
   <numThreads>1</numThreads>
   <filePaths>
      <string>C:\Users\lab\raw\a.raw</string>
      <string>C:\Users\lab\raw\b.raw</string>
      <string>C:\Users\lab\raw\c.raw</string>
   </filePaths>
</MaxQuantParams>
"#;

/// Path to the `mqsubmit` binary.
///
/// The binary belongs to the `mqsubmit` package, so cargo does not export
/// `CARGO_BIN_EXE_mqsubmit` to this one. Build it once per run into a
/// separate target directory beside the one holding this test executable.
pub fn mqsubmit_binary() -> &'static Path {
    static BINARY: OnceLock<PathBuf> = OnceLock::new();
    BINARY.get_or_init(|| match option_env!("CARGO_BIN_EXE_mqsubmit") {
        Some(path) => PathBuf::from(path),
        None => build_mqsubmit(),
    })
}

fn build_mqsubmit() -> PathBuf {
    let exe = std::env::current_exe().unwrap();
    // <target>/<profile>/deps/specs-<hash>
    let profile_dir = exe.parent().and_then(Path::parent).unwrap();
    let release = profile_dir.file_name().is_some_and(|name| name == "release");
    let target_dir = profile_dir.parent().unwrap().join("specs-bin");

    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let mut build = std::process::Command::new(cargo);
    build
        .args(["build", "--quiet", "-p", "mqsubmit", "--bin", "mqsubmit", "--target-dir"])
        .arg(&target_dir)
        .current_dir(env!("CARGO_MANIFEST_DIR"));
    if release {
        build.arg("--release");
    }
    let status = build.status().unwrap();
    assert!(status.success(), "building mqsubmit failed: {status}");

    let profile = if release { "release" } else { "debug" };
    let binary = target_dir.join(profile).join(format!("mqsubmit{}", std::env::consts::EXE_SUFFIX));
    assert!(binary.exists(), "mqsubmit binary not found at {}", binary.display());
    binary
}

/// `mqsubmit` with no inherited profile, log or AWS settings
pub fn cli() -> Run {
    let mut cmd = assert_cmd::Command::new(mqsubmit_binary());
    for var in [
        "MQSUBMIT_PROFILE",
        "MQSUBMIT_LOG",
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "AWS_SESSION_TOKEN",
        "AWS_CREDENTIAL_EXPIRATION",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("XDG_CONFIG_HOME", std::env::temp_dir().join("mqsubmit-specs-no-config"));
    Run { cmd }
}

pub struct Run {
    cmd: assert_cmd::Command,
}

impl Run {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit status 0
    pub fn passes(mut self) -> Outcome {
        let outcome = Outcome::from(self.cmd.output().unwrap());
        assert_eq!(outcome.code, Some(0), "expected success\n{outcome}");
        outcome
    }

    /// Run and require exit status 1
    pub fn fails(mut self) -> Outcome {
        let outcome = Outcome::from(self.cmd.output().unwrap());
        assert_eq!(outcome.code, Some(1), "expected exit status 1\n{outcome}");
        outcome
    }
}

pub struct Outcome {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Outcome {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "code: {:?}\n--- stdout\n{}\n--- stderr\n{}", self.code, self.stdout, self.stderr)
    }
}

impl Outcome {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout lacks {needle:?}\n{self}");
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout has {needle:?}\n{self}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr lacks {needle:?}\n{self}");
        self
    }
}

/// Temporary job directory plus a local-backend profile rooted beside it
pub struct JobDir {
    temp: TempDir,
}

impl JobDir {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let job = temp.path().join("job");
        std::fs::create_dir_all(&job).unwrap();
        std::fs::write(job.join("mqpar.xml"), MQPAR).unwrap();
        for (name, size) in [("a.raw", 10_000), ("b.raw", 10_000), ("c.raw", 5_000), ("human.fasta", 100)] {
            std::fs::write(job.join(name), vec![0u8; size]).unwrap();
        }

        let store = temp.path().join("store");
        std::fs::write(
            temp.path().join("profile.toml"),
            format!(
                "backend = \"local\"\nlocal_root = {:?}\n\n[worker]\nspool_dir = {:?}\n",
                store.display().to_string(),
                temp.path().join("spool").display().to_string(),
            ),
        )
        .unwrap();
        Self { temp }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.temp.path().join(rel)
    }

    pub fn config(&self) -> String {
        self.path("job/mqpar.xml").display().to_string()
    }

    pub fn remove(&self, rel: &str) {
        std::fs::remove_file(self.path(rel)).unwrap();
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).unwrap()
    }

    /// `mqsubmit` pointed at this directory's profile
    pub fn mqsubmit(&self) -> Run {
        cli().env("MQSUBMIT_PROFILE", self.path("profile.toml"))
    }

    pub fn submit(&self, name: &str, extra: &[&str]) -> Run {
        let config = self.config();
        let mut args =
            vec!["submit", "-m", config.as_str(), "-n", name, "-d", "acme", "-e", "user@example.org"];
        args.extend_from_slice(extra);
        self.mqsubmit().args(&args)
    }
}
