//! Batch runner integration tests
//!
//! Drives full passes against a scripted converter and checks the files left
//! in the output directory.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{list_dir, runner, Behavior, ScriptedConverter};
use gifloop::runner::SlotState;
use tempfile::tempdir;

#[tokio::test]
async fn scenario_a_succeeds_b_fails_c_succeeds() {
    let dir = tempdir().unwrap();
    let converter = Arc::new(ScriptedConverter::new());
    converter.set("A", Behavior::Succeed(b"gif-a".to_vec()));
    converter.set("B", Behavior::FailPartial);
    converter.set("C", Behavior::Succeed(b"gif-c".to_vec()));

    let mut runner = runner(dir.path(), &["A", "B", "C"], converter.clone());
    let report = runner.run_pass().await;

    let out = dir.path();
    assert_eq!(std::fs::read(out.join("item_1.gif")).unwrap(), b"gif-a");
    assert!(!out.join("item_1_temp.gif").exists());
    assert!(!out.join("item_2.gif").exists());
    assert!(!out.join("item_2_temp.gif").exists());
    assert_eq!(std::fs::read(out.join("item_3.gif")).unwrap(), b"gif-c");

    let states: Vec<SlotState> = report.items.iter().map(|i| i.state).collect();
    assert_eq!(
        states,
        vec![SlotState::Published, SlotState::Discarded, SlotState::Published]
    );
    assert!(report.items[1]
        .error
        .as_deref()
        .unwrap()
        .contains("connection reset"));

    // The next pass starts over from the first source
    runner.run_pass().await;
    assert_eq!(
        converter.sources_called(),
        vec!["A", "B", "C", "A", "B", "C"]
    );
}

#[tokio::test]
async fn run_restarts_from_first_source_after_each_pass() {
    let dir = tempdir().unwrap();
    let converter = Arc::new(ScriptedConverter::new());
    converter.set("B", Behavior::FailPartial);

    let runner = runner(dir.path(), &["A", "B", "C"], converter.clone());
    converter.stop_after(7, runner.stop_signal());

    tokio::time::timeout(Duration::from_secs(5), runner.run())
        .await
        .expect("runner did not stop");

    assert_eq!(
        converter.sources_called(),
        vec!["A", "B", "C", "A", "B", "C", "A"]
    );
    assert_eq!(
        list_dir(dir.path()),
        vec!["item_1.gif", "item_3.gif"]
    );
}

#[tokio::test]
async fn run_stops_between_items() {
    let dir = tempdir().unwrap();
    let converter = Arc::new(ScriptedConverter::new());

    let runner = runner(dir.path(), &["A", "B", "C"], converter.clone());
    converter.stop_after(2, runner.stop_signal());

    tokio::time::timeout(Duration::from_secs(5), runner.run())
        .await
        .expect("runner did not stop");

    assert_eq!(converter.sources_called(), vec!["A", "B"]);
    assert_eq!(list_dir(dir.path()), vec!["item_1.gif", "item_2.gif"]);
}

#[tokio::test]
async fn stopped_pass_reports_only_items_that_ran() {
    let dir = tempdir().unwrap();
    let converter = Arc::new(ScriptedConverter::new());
    let mut runner = runner(dir.path(), &["A", "B", "C"], converter.clone());
    converter.stop_after(1, runner.stop_signal());

    let report = runner.run_pass().await;

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].state, SlotState::Published);
}

#[tokio::test]
async fn failure_does_not_stop_later_items() {
    let dir = tempdir().unwrap();
    let converter = Arc::new(ScriptedConverter::new());
    converter.set("first", Behavior::Fail);

    let mut runner = runner(dir.path(), &["first", "second", "third"], converter.clone());
    let report = runner.run_pass().await;

    assert_eq!(converter.sources_called(), vec!["first", "second", "third"]);
    assert_eq!(report.discarded(), 1);
    assert_eq!(report.published(), 2);
    assert!(!dir.path().join("item_1_temp.gif").exists());
    assert!(dir.path().join("item_3.gif").exists());
}

#[tokio::test]
async fn repeated_passes_reuse_slot_names() {
    let dir = tempdir().unwrap();
    let converter = Arc::new(ScriptedConverter::new());
    let mut runner = runner(dir.path(), &["a", "b", "c"], converter);

    for _ in 0..3 {
        runner.run_pass().await;
    }

    assert_eq!(
        list_dir(dir.path()),
        vec!["item_1.gif", "item_2.gif", "item_3.gif"]
    );
}

#[tokio::test]
async fn conversions_never_overlap() {
    let dir = tempdir().unwrap();
    let converter = Arc::new(ScriptedConverter::new().with_delay(Duration::from_millis(20)));
    let mut runner = runner(dir.path(), &["a", "b", "c", "d"], converter.clone());

    runner.run_pass().await;

    assert_eq!(converter.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(converter.calls.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn requests_use_slot_temp_path_and_fixed_duration() {
    let dir = tempdir().unwrap();
    let converter = Arc::new(ScriptedConverter::new());
    let mut runner = runner(dir.path(), &["https://a/main.m3u8"], converter.clone());

    runner.run_pass().await;

    let calls = converter.calls.lock().unwrap();
    assert_eq!(calls[0].source, "https://a/main.m3u8");
    assert_eq!(calls[0].output, dir.path().join("item_1_temp.gif"));
    assert_eq!(calls[0].duration_secs, 20);
    assert_eq!(calls[0].start_secs, 0.0);
}

#[tokio::test]
async fn stale_temp_is_cleared_before_converting() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("item_1_temp.gif"), b"stale").unwrap();

    let converter = Arc::new(ScriptedConverter::new());
    converter.set("a", Behavior::Fail);
    let mut runner = runner(dir.path(), &["a"], converter.clone());

    runner.run_pass().await;

    assert_eq!(*converter.temp_existed.lock().unwrap(), vec![false]);
    assert!(!dir.path().join("item_1_temp.gif").exists());
}

#[tokio::test]
async fn failed_item_keeps_previous_final() {
    let dir = tempdir().unwrap();
    let converter = Arc::new(ScriptedConverter::new());
    converter.set("b", Behavior::Succeed(b"first-b".to_vec()));
    let mut runner = runner(dir.path(), &["a", "b"], converter.clone());

    runner.run_pass().await;
    converter.set("b", Behavior::FailPartial);
    let report = runner.run_pass().await;

    assert_eq!(report.items[1].state, SlotState::Discarded);
    assert_eq!(
        std::fs::read(dir.path().join("item_2.gif")).unwrap(),
        b"first-b"
    );
    assert!(!dir.path().join("item_2_temp.gif").exists());
}

#[tokio::test]
async fn publish_failure_is_reported_and_runner_moves_on() {
    let dir = tempdir().unwrap();
    let converter = Arc::new(ScriptedConverter::new());
    converter.set("a", Behavior::SucceedEmpty);
    let mut runner = runner(dir.path(), &["a", "b"], converter.clone());

    let report = runner.run_pass().await;

    assert_eq!(report.items[0].state, SlotState::Published);
    assert!(report.items[0]
        .publish_error
        .as_deref()
        .unwrap()
        .contains("temporary artifact missing"));
    assert!(!dir.path().join("item_1.gif").exists());
    assert!(dir.path().join("item_2.gif").exists());
}
