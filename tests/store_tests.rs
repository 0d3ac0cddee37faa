//! Integration tests for capture, autoremove, listing and attachment delivery.

mod common;

use std::fs;
use std::time::{Duration as StdDuration, SystemTime};

use assert_fs::prelude::*;
use chrono::{DateTime, Duration, Utc};
use predicates::prelude::*;

use filemailer::config::PanelConfig;
use filemailer::error::FileMailerError;
use filemailer::inspect::Inspector;
use filemailer::store::MessageStore;

fn settings_without_autoremove() -> PanelConfig {
    PanelConfig {
        autoremove: None,
        ..PanelConfig::default()
    }
}

fn utc(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

// ─── Capture ────────────────────────────────────────────────────────

#[test]
fn test_send_then_read_yields_identical_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = MessageStore::new(Some(temp.path().to_path_buf()));

    let written = store.send(common::PLAIN.as_bytes()).unwrap();
    assert_eq!(written, common::PLAIN.len());

    let files: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(files.len(), 1);

    let expected_name = format!("{}abc123", store.prefix());
    temp.child(&expected_name).assert(predicate::path::is_file());
    assert_eq!(
        fs::read(temp.child(&expected_name).path()).unwrap(),
        common::PLAIN.as_bytes()
    );
}

#[test]
fn test_send_creates_directory() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mails = temp.child("mails");
    mails.assert(predicate::path::missing());

    let store = MessageStore::new(Some(mails.path().to_path_buf()));
    store.send(common::alternative().as_bytes()).unwrap();

    mails.assert(predicate::path::is_dir());
    mails
        .child(format!("{}x7k2p9q1zz", store.prefix()))
        .assert(predicate::path::is_file());
}

#[test]
fn test_send_without_directory_configured() {
    let store = MessageStore::new(None);
    assert!(matches!(
        store.send(common::PLAIN.as_bytes()),
        Err(FileMailerError::Configuration)
    ));
}

#[test]
fn test_sends_from_one_store_share_the_prefix() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = MessageStore::new(Some(temp.path().to_path_buf()));
    store.send(common::plain_with_date("first", None).as_bytes()).unwrap();
    store.send(common::plain_with_date("second", None).as_bytes()).unwrap();

    let mut names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            format!("{}first", store.prefix()),
            format!("{}second", store.prefix())
        ]
    );
}

// ─── Autoremove ─────────────────────────────────────────────────────

#[test]
fn test_autoremove_cutoff_in_past_deletes_nothing() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a").write_str(common::PLAIN).unwrap();
    temp.child("b").write_str(common::PLAIN).unwrap();

    let mut inspector = Inspector::new(temp.path(), settings_without_autoremove());
    let removed = inspector
        .autoremove_before(Utc::now() - Duration::days(1))
        .unwrap();
    assert_eq!(removed, 0);
    temp.child("a").assert(predicate::path::exists());
    temp.child("b").assert(predicate::path::exists());
}

#[test]
fn test_autoremove_cutoff_in_future_deletes_everything_older() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a").write_str(common::PLAIN).unwrap();
    temp.child("b").write_str(common::PLAIN).unwrap();

    let mut inspector = Inspector::new(temp.path(), settings_without_autoremove());
    let removed = inspector
        .autoremove_before(Utc::now() + Duration::hours(1))
        .unwrap();
    assert_eq!(removed, 2);
    temp.child("a").assert(predicate::path::missing());
    temp.child("b").assert(predicate::path::missing());
}

#[test]
fn test_listing_applies_configured_autoremove() {
    let temp = assert_fs::TempDir::new().unwrap();
    let old = temp.child("old");
    old.write_str(common::PLAIN).unwrap();
    let an_hour_ago = SystemTime::now() - StdDuration::from_secs(3600);
    fs::File::options()
        .write(true)
        .open(old.path())
        .unwrap()
        .set_modified(an_hour_ago)
        .unwrap();
    temp.child("fresh").write_str(common::PLAIN).unwrap();

    let settings = PanelConfig {
        autoremove: Some("-10 minutes".parse().unwrap()),
        ..PanelConfig::default()
    };
    let mut inspector = Inspector::new(temp.path(), settings);
    let listing = inspector.list_messages().unwrap();

    assert_eq!(listing.count_all(), 1);
    assert_eq!(listing.messages[0].filename.as_deref(), Some("fresh"));
    old.assert(predicate::path::missing());
}

// ─── Listing ────────────────────────────────────────────────────────

#[test]
fn test_listing_sorted_newest_first_with_undated_last() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("1-nodate")
        .write_str(&common::plain_with_date("nodate", None))
        .unwrap();
    temp.child("2-t3")
        .write_str(&common::plain_with_date("t3", Some("Mon, 01 Jan 2024 00:00:00 +0000")))
        .unwrap();
    temp.child("3-t1")
        .write_str(&common::plain_with_date("t1", Some("Mon, 01 Jan 2024 00:00:10 +0000")))
        .unwrap();
    temp.child("4-t2")
        .write_str(&common::plain_with_date("t2", Some("Mon, 01 Jan 2024 00:00:05 +0000")))
        .unwrap();

    let mut inspector = Inspector::new(temp.path(), settings_without_autoremove());
    let listing = inspector
        .list_messages_at(utc("2024-01-01T00:00:11Z"))
        .unwrap();

    let ids: Vec<_> = listing
        .messages
        .iter()
        .map(|m| m.message_id.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(ids, vec!["t1", "t2", "t3", "nodate"]);

    // new = dated after now - 2 seconds
    assert_eq!(listing.count_new, 1);
    assert_eq!(listing.count_all(), 4);
}

#[test]
fn test_listing_reuses_cache() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("m").write_str(common::PLAIN).unwrap();

    let mut inspector = Inspector::new(temp.path(), settings_without_autoremove());
    let first = inspector.list_messages().unwrap();
    let second = inspector.list_messages().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first.messages[0], &second.messages[0]));
}

#[test]
fn test_empty_store_is_hidden() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut inspector = Inspector::new(temp.path(), settings_without_autoremove());
    let listing = inspector.list_messages().unwrap();
    assert!(!listing.is_visible(true));
    assert!(listing.is_visible(false));
}

// ─── Delete all ─────────────────────────────────────────────────────

#[test]
fn test_delete_all() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a").write_str(common::PLAIN).unwrap();
    temp.child("b").write_str(&common::alternative()).unwrap();

    let mut inspector = Inspector::new(temp.path(), settings_without_autoremove());
    assert_eq!(inspector.list_messages().unwrap().count_all(), 2);
    assert_eq!(inspector.delete_all().unwrap(), 2);
    assert_eq!(inspector.list_messages().unwrap().count_all(), 0);
    temp.child("a").assert(predicate::path::missing());
}

// ─── Attachment delivery ────────────────────────────────────────────

#[test]
fn test_download_attachment() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("20240103080000-m1x2y3z4w5")
        .write_str(&common::mixed(&[("hello.txt", "SGVsbG8gd29ybGQ=")]))
        .unwrap();

    let mut inspector = Inspector::new(temp.path(), settings_without_autoremove());
    let message = inspector.message("20240103080000-m1x2y3z4w5").unwrap();
    let key = message.attachments.keys().next().unwrap().clone();

    let download = inspector
        .download_attachment("20240103080000-m1x2y3z4w5", &key)
        .unwrap();
    assert_eq!(download.suggested_filename, "hello.txt");
    assert_eq!(download.content_type, "application/octet-stream");
    assert_eq!(download.bytes, b"Hello world");
}

#[test]
fn test_download_unknown_key_or_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("m")
        .write_str(&common::mixed(&[("a.txt", "YQ==")]))
        .unwrap();

    let mut inspector = Inspector::new(temp.path(), settings_without_autoremove());
    assert!(matches!(
        inspector.download_attachment("m", "nope"),
        Err(FileMailerError::NotFound(_))
    ));
    assert!(matches!(
        inspector.download_attachment("missing", "nope"),
        Err(FileMailerError::NotFound(_))
    ));
}

#[test]
fn test_capture_then_inspect() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = MessageStore::new(Some(temp.path().to_path_buf()));
    store
        .send(common::mixed(&[("a.txt", "YQ==")]).as_bytes())
        .unwrap();

    let mut inspector = Inspector::new(temp.path(), settings_without_autoremove());
    let listing = inspector.list_messages().unwrap();
    assert_eq!(listing.count_all(), 1);

    let message = &listing.messages[0];
    let expected = format!("{}m1x2y3z4w5", store.prefix());
    assert_eq!(message.filename.as_deref(), Some(expected.as_str()));
    assert_eq!(message.message_id.as_deref(), Some("m1x2y3z4w5"));
    assert_eq!(message.subject(), Some("Invoice"));
    assert_eq!(message.attachments.len(), 1);
}
