// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn empty_profile_override_is_ignored() {
    std::env::set_var("MQSUBMIT_PROFILE", "");
    assert_eq!(profile_path(), None);

    std::env::set_var("MQSUBMIT_PROFILE", "/etc/mqsubmit.toml");
    assert_eq!(profile_path(), Some(PathBuf::from("/etc/mqsubmit.toml")));
    std::env::remove_var("MQSUBMIT_PROFILE");
}

#[test]
#[serial]
fn log_filter_reads_directives() {
    std::env::set_var("MQSUBMIT_LOG", "mq_engine=debug");
    assert_eq!(log_filter().as_deref(), Some("mq_engine=debug"));
    std::env::remove_var("MQSUBMIT_LOG");
    assert_eq!(log_filter(), None);
}

#[test]
#[serial]
fn xdg_config_home_wins() {
    std::env::set_var("XDG_CONFIG_HOME", "/tmp/xdg");
    assert_eq!(config_dir(), Some(PathBuf::from("/tmp/xdg")));
    std::env::remove_var("XDG_CONFIG_HOME");
}
