//! Integration tests for the fw command-line interface.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STORY: &str = r#"{
    "title": "The Ferry",
    "start": "dock",
    "items": [{ "id": "ticket", "name": "Ticket", "stackable": false }],
    "stats": [{ "id": "nerve", "name": "Nerve", "min": 0, "max": 3, "initial": 1 }],
    "endings": [{ "id": "crossed", "title": "Across the River", "text": "The far bank at last." }],
    "scenes": [
        {
            "id": "dock",
            "text": "Fog on the water, {player_name}.",
            "choices": [
                {
                    "id": "buy",
                    "text": "Buy a ticket",
                    "effects": [{ "type": "add_item", "item": "ticket" }]
                },
                {
                    "id": "board",
                    "text": "Board the ferry",
                    "conditions": [{ "type": "has_item", "item": "ticket", "quantity": 1 }],
                    "show_if_condition_false": true,
                    "target": "deck"
                }
            ]
        },
        {
            "id": "deck",
            "text": "The ferry pulls away.",
            "choices": [{ "id": "wait", "text": "Wait", "target": "crossed" }]
        }
    ]
}"#;

/// Create a temp directory holding a small story.
fn test_story() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ferry.json"), STORY).unwrap();
    dir
}

fn story_path(dir: &TempDir) -> String {
    dir.path().join("ferry.json").to_str().unwrap().to_string()
}

fn saves_path(dir: &TempDir) -> String {
    dir.path().join("saves").to_str().unwrap().to_string()
}

fn fw() -> Command {
    Command::cargo_bin("fw").unwrap()
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_story_file() {
    let parent = TempDir::new().unwrap();
    fw().args(["init", "forest"])
        .current_dir(parent.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created story 'forest'"));

    assert!(parent.path().join("forest.json").exists());
}

#[test]
fn init_fails_if_file_exists() {
    let parent = TempDir::new().unwrap();
    fs::write(parent.path().join("forest.json"), "{}").unwrap();

    fw().args(["init", "forest"])
        .current_dir(parent.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_template_passes_check() {
    let parent = TempDir::new().unwrap();
    fw().args(["init", "forest"])
        .current_dir(parent.path())
        .assert()
        .success();

    fw().args(["check", "forest.json"])
        .current_dir(parent.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_valid_story() {
    let dir = test_story();
    fw().args(["check", &story_path(&dir)])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("All checks passed for 'The Ferry'")
                .and(predicate::str::contains("2 scenes, 1 endings"))
                .and(predicate::str::contains("1 items, 1 stats, 0 achievements")),
        );
}

#[test]
fn check_fails_on_dangling_target() {
    let dir = TempDir::new().unwrap();
    let broken = STORY.replace(r#""target": "deck""#, r#""target": "dekc""#);
    fs::write(dir.path().join("ferry.json"), broken).unwrap();

    fw().args(["check", &story_path(&dir)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dekc"));
}

#[test]
fn check_fails_on_invalid_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ferry.json"), "this is not json { {").unwrap();

    fw().args(["check", &story_path(&dir)]).assert().failure();
}

#[test]
fn check_missing_file() {
    let dir = TempDir::new().unwrap();
    fw().args(["check", &story_path(&dir)]).assert().failure();
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_shows_scene_and_locked_choice() {
    let dir = test_story();
    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .args(["--player", "Ada"])
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Fog on the water, Ada.")
                .and(predicate::str::contains("Buy a ticket"))
                .and(predicate::str::contains("(locked)")),
        );
}

#[test]
fn play_through_to_ending() {
    let dir = test_story();
    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .write_stdin("1\n2\n1\n1\nquit\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("The ferry pulls away.")
                .and(predicate::str::contains("Across the River"))
                .and(predicate::str::contains("The story has ended")),
        );
}

#[test]
fn play_locked_choice_is_refused() {
    let dir = test_story();
    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .write_stdin("2\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("no longer available")
                .and(predicate::str::contains("The ferry pulls away.").not()),
        );
}

#[test]
fn play_unknown_command_and_out_of_range() {
    let dir = test_story();
    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .write_stdin("dance\n9\nquit\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Unknown command 'dance'")
                .and(predicate::str::contains("There is no choice 9.")),
        );
}

#[test]
fn play_status_shows_stats_and_inventory() {
    let dir = test_story();
    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .write_stdin("1\nstatus\nquit\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Nerve")
                .and(predicate::str::contains("1/3"))
                .and(predicate::str::contains("Ticket")),
        );
}

#[test]
fn play_save_then_resume() {
    let dir = test_story();
    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .write_stdin("1\n2\nsave slot_2\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to slot_2."));

    assert!(Path::new(&saves_path(&dir)).join("slot_2.json").exists());

    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .args(["--load", "slot_2"])
        .write_stdin("status\nquit\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("The ferry pulls away.")
                .and(predicate::str::contains("Ticket")),
        );
}

#[test]
fn play_load_missing_slot_fails() {
    let dir = test_story();
    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .args(["--load", "slot_4"])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no save in slot"));
}

#[test]
fn play_without_autosave_writes_nothing() {
    let dir = test_story();
    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .arg("--no-autosave")
        .write_stdin("1\nquit\n")
        .assert()
        .success();

    assert!(!Path::new(&saves_path(&dir)).join("autosave.json").exists());
}

// ---------------------------------------------------------------------------
// saves / delete
// ---------------------------------------------------------------------------

#[test]
fn saves_lists_autosave_after_play() {
    let dir = test_story();
    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .write_stdin("quit\n")
        .assert()
        .success();

    fw().args(["saves", "--saves", &saves_path(&dir)])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("autosave")
                .and(predicate::str::contains("dock"))
                .and(predicate::str::contains("1 of 6 slots in use")),
        );
}

#[test]
fn saves_empty_directory() {
    let dir = TempDir::new().unwrap();
    fw().args(["saves", "--saves", &saves_path(&dir), "--slots", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 3 slots in use"));
}

#[test]
fn delete_removes_slot() {
    let dir = test_story();
    fw().args(["play", &story_path(&dir), "--saves", &saves_path(&dir)])
        .write_stdin("quit\n")
        .assert()
        .success();

    fw().args(["delete", "autosave", "--saves", &saves_path(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted save 'autosave'"));

    assert!(!Path::new(&saves_path(&dir)).join("autosave.json").exists());
}

#[test]
fn delete_missing_slot_fails() {
    let dir = TempDir::new().unwrap();
    fw().args(["delete", "slot_1", "--saves", &saves_path(&dir)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no save in slot"));
}

#[test]
fn delete_rejects_bad_slot_name() {
    let dir = TempDir::new().unwrap();
    fw().args(["delete", "../escape", "--saves", &saves_path(&dir)])
        .assert()
        .failure();
}
