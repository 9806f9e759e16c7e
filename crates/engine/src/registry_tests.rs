// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mq_adapters::{FakeStore, StoreCall};
use mq_core::test_support::{identity, job_spec};

fn registry() -> (FakeStore, JobRegistry<FakeStore>) {
    let store = FakeStore::new();
    (store.clone(), JobRegistry::new(store, "mqpar.xml"))
}

#[tokio::test]
async fn exists_is_false_for_unknown_job() {
    let (_store, registry) = registry();
    assert!(!registry.exists(&identity("acme", "run1")).await.unwrap());
}

#[tokio::test]
async fn exists_is_true_once_config_is_present() {
    let (store, registry) = registry();
    store.insert("acme-run1/mqpar.xml", "<MaxQuantParams/>");
    assert!(registry.exists(&identity("acme", "run1")).await.unwrap());
    assert!(!registry.exists(&identity("acme", "run2")).await.unwrap());
}

#[tokio::test]
async fn exists_surfaces_store_failures() {
    let (store, registry) = registry();
    store.fail_on("acme-run1/mqpar.xml", "access denied");

    let err = registry.exists(&identity("acme", "run1")).await.unwrap_err();
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn register_writes_config_then_job_info() {
    let (store, registry) = registry();
    let spec = job_spec("acme", "run1", &[("a.raw", 10)], &["db.fasta"]);

    let layout = registry.register(&spec, "<MaxQuantParams/>").await.unwrap();
    assert_eq!(layout.folder(), "acme-run1");
    assert_eq!(
        store.writes(),
        vec![
            StoreCall::PutIfAbsent("acme-run1/mqpar.xml".into()),
            StoreCall::Put("acme-run1/jobCtrl/jobinfo.txt".into()),
        ]
    );
    assert_eq!(store.text("acme-run1/jobCtrl/jobinfo.txt").unwrap(), "run1,acme,user@example.org");
    assert_eq!(store.text("acme-run1/mqpar.xml").unwrap(), "<MaxQuantParams/>");
}

#[tokio::test]
async fn second_registration_is_duplicate_and_writes_nothing_else() {
    let (store, registry) = registry();
    let spec = job_spec("acme", "run1", &[("a.raw", 10)], &[]);
    registry.register(&spec, "first").await.unwrap();

    let err = registry.register(&spec, "second").await.unwrap_err();
    assert!(matches!(err, RegistryError::Duplicate(ref folder) if folder == "acme-run1"));
    assert_eq!(store.text("acme-run1/mqpar.xml").unwrap(), "first");
    assert_eq!(store.writes().len(), 3);
}

#[tokio::test]
async fn racing_registrations_have_one_winner() {
    let (store, registry) = registry();
    let spec = job_spec("acme", "run1", &[("a.raw", 10)], &[]);

    let (a, b) = tokio::join!(registry.register(&spec, "a"), registry.register(&spec, "b"));
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let loser = if a.is_err() { a } else { b };
    assert!(matches!(loser, Err(RegistryError::Duplicate(_))));
    assert!(store.contains("acme-run1/jobCtrl/jobinfo.txt"));
}
