// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn folder_joins_department_and_name() {
    let id = JobIdentity::new("acme", "run1").unwrap();
    assert_eq!(id.folder(), "acme-run1");
    assert_eq!(id.to_string(), "acme-run1");
}

#[yare::parameterized(
    leading_trailing = { "  acme ", " run1\t", "acme-run1" },
    embedded_spaces  = { "ac me",   "run 1",   "acme-run1" },
    dots_underscores = { "lab_a.b", "run-2",   "lab_a.b-run-2" },
)]
fn identity_normalizes_whitespace(department: &str, name: &str, folder: &str) {
    assert_eq!(JobIdentity::new(department, name).unwrap().folder(), folder);
}

#[test]
fn identity_rejects_empty_department() {
    assert_eq!(JobIdentity::new("   ", "run1"), Err(SpecError::Empty { field: "department" }));
}

#[test]
fn identity_rejects_empty_name() {
    assert_eq!(JobIdentity::new("acme", ""), Err(SpecError::Empty { field: "job name" }));
}

#[yare::parameterized(
    slash     = { "_adm/scicomp", '/' },
    backslash = { "a\\b",         '\\' },
    quote     = { "o'brien",      '\'' },
    dollar    = { "$lab",         '$' },
    semicolon = { "lab;rm",       ';' },
)]
fn identity_rejects_unsafe_characters(department: &str, bad: char) {
    match JobIdentity::new(department, "run1") {
        Err(SpecError::InvalidChar { ch, .. }) => assert_eq!(ch, bad),
        other => panic!("expected InvalidChar, got {other:?}"),
    }
}

#[yare::parameterized(
    lower = { "software" },
    upper = { "SOFTWARE" },
    mixed = { " Soft ware " },
)]
fn software_department_is_reserved(department: &str) {
    let err = JobIdentity::new(department, "run1").unwrap_err();
    assert!(matches!(err, SpecError::ReservedDepartment(_)), "{err:?}");
}

#[test]
fn software_as_job_name_is_fine() {
    assert_eq!(JobIdentity::new("acme", "software").unwrap().folder(), "acme-software");
}

#[test]
fn identity_equality_follows_normalized_form() {
    let a = JobIdentity::new("acme", "run 1").unwrap();
    let b = JobIdentity::new("acme", "run1").unwrap();
    assert_eq!(a, b);
}

#[yare::parameterized(
    plain      = { "user@example.org",    "user@example.org" },
    whitespace = { " user@example.org\n", "user@example.org" },
)]
fn contact_is_normalized(raw: &str, expected: &str) {
    assert_eq!(normalize_contact(raw).unwrap(), expected);
}

#[yare::parameterized(
    no_at       = { "user.example.org" },
    empty_local = { "@example.org" },
    empty_host  = { "user@" },
    two_ats     = { "a@b@c" },
)]
fn contact_rejects_non_addresses(raw: &str) {
    assert!(matches!(normalize_contact(raw), Err(SpecError::InvalidContact(_))));
}

#[test]
fn contact_rejects_empty() {
    assert_eq!(normalize_contact(" "), Err(SpecError::Empty { field: "contact" }));
}
