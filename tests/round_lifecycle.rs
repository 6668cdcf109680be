use std::sync::Arc;

use mehfil::engine::round::{LINES_PER_ROUND, MAX_LINE_CHARS};
use mehfil::engine::{LineOutcome, ManualClock, RoundCoordinator};
use mehfil::model::RoundState;
use mehfil::store::{keys, KvStore, MemoryStore};

fn build(local_id: &str) -> (Arc<MemoryStore>, RoundCoordinator) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let coordinator = RoundCoordinator::new(store.clone(), clock, local_id.into());
    (store, coordinator)
}

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn start_round_resets_state() {
    let (_, coordinator) = build("me");

    let state = coordinator.start_round(ids(&["A", "B", "C"])).unwrap();
    let read = coordinator.state().unwrap();
    assert_eq!(read, state);
    assert!(read.active);
    assert!(read.lines.is_empty());
    assert_eq!(read.participants, ids(&["A", "B", "C"]));

    coordinator.start_round(Vec::new()).unwrap();
    assert_eq!(coordinator.state().unwrap().participants, ids(&["me"]));
}

#[test]
fn authors_follow_line_count() {
    for k in 1..=4 {
        let (_, coordinator) = build("me");
        let participants: Vec<String> = (0..k).map(|i| format!("p{i}")).collect();
        coordinator.start_round(participants.clone()).unwrap();

        for n in 0..LINES_PER_ROUND - 1 {
            let LineOutcome::Added(line) = coordinator.add_line(&format!("line {n}")).unwrap() else {
                panic!("line {n} should be added");
            };
            assert_eq!(line.author_id, participants[n % k], "k={k} n={n}");
        }
    }
}

#[test]
fn fifth_line_archives_and_resets() {
    let (store, coordinator) = build("me");
    coordinator.start_round(ids(&["A", "B"])).unwrap();

    let texts = [" hello", "world ", "foo", "bar", "  baz  "];
    let mut outcomes = Vec::new();
    for text in texts {
        outcomes.push(coordinator.add_line(text).unwrap());
    }

    let LineOutcome::Completed { line, entry } = outcomes.pop().unwrap() else {
        panic!("fifth line should complete the round");
    };
    assert_eq!(line.author_id, "A");
    assert_eq!(entry.story, "hello world foo bar baz");
    assert_eq!(entry.participant_ids, ids(&["A", "B"]));

    assert_eq!(coordinator.state().unwrap(), RoundState::default());
    assert_eq!(store.get(keys::ROUND).unwrap(), None);
    assert_eq!(coordinator.archive().unwrap(), vec![entry]);
}

#[test]
fn add_line_without_round_is_ignored() {
    let (store, coordinator) = build("me");

    assert_eq!(coordinator.add_line("nobody home").unwrap(), LineOutcome::Ignored);
    assert_eq!(store.get(keys::ROUND).unwrap(), None);

    // Active but empty participant list, as another view might have written.
    store
        .set(
            keys::ROUND,
            r#"{"active":true,"participants":[],"lines":[],"roundStart":1}"#,
        )
        .unwrap();
    let before = coordinator.state().unwrap();
    assert_eq!(coordinator.add_line("still nobody").unwrap(), LineOutcome::Ignored);
    assert_eq!(coordinator.state().unwrap(), before);
    assert!(coordinator.archive().unwrap().is_empty());
}

#[test]
fn finishing_empty_round_is_ignored() {
    let (_, coordinator) = build("me");
    coordinator.start_round(ids(&["A"])).unwrap();
    let before = coordinator.state().unwrap();

    assert_eq!(coordinator.finish_round(None).unwrap(), None);
    assert_eq!(coordinator.state().unwrap(), before);
    assert!(coordinator.archive().unwrap().is_empty());
}

#[test]
fn state_survives_restart() {
    let (store, coordinator) = build("me");
    coordinator.start_round(ids(&["A", "B"])).unwrap();
    coordinator.add_line("pehli").unwrap();
    coordinator.add_line("doosri").unwrap();
    let before = coordinator.state().unwrap();
    drop(coordinator);

    let clock = Arc::new(ManualClock::new(0));
    let reopened = RoundCoordinator::new(store, clock, "me".into());
    assert_eq!(reopened.state().unwrap(), before);
}

#[test]
fn corrupt_state_reads_as_default() {
    let (store, coordinator) = build("me");

    for raw in ["", "{", "null", "[1,2]", r#"{"active":"yes"}"#] {
        store.set(keys::ROUND, raw).unwrap();
        assert_eq!(coordinator.state().unwrap(), RoundState::default(), "raw={raw:?}");
    }

    store.set(keys::ARCHIVE, "not an array").unwrap();
    assert!(coordinator.archive().unwrap().is_empty());
}

#[test]
fn corrupt_archive_is_replaced_on_next_finish() {
    let (store, coordinator) = build("me");
    store.set(keys::ARCHIVE, "{broken").unwrap();

    coordinator.start_round(ids(&["A"])).unwrap();
    coordinator.add_line("naya").unwrap();
    coordinator.finish_round(None).unwrap();

    assert_eq!(coordinator.archive().unwrap().len(), 1);
}

#[test]
fn text_is_truncated_not_validated() {
    let (_, coordinator) = build("me");
    coordinator.start_round(ids(&["A"])).unwrap();

    let LineOutcome::Added(long) = coordinator.add_line(&"x".repeat(200)).unwrap() else {
        panic!("long line should be added");
    };
    assert_eq!(long.text.len(), MAX_LINE_CHARS);

    let LineOutcome::Added(blank) = coordinator.add_line("   ").unwrap() else {
        panic!("blank line should be added");
    };
    assert_eq!(blank.text, "   ");
}

#[test]
fn any_view_can_write_for_the_author_due() {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));
    let a = RoundCoordinator::new(store.clone(), clock.clone(), "A".into());
    let b = RoundCoordinator::new(store, clock, "B".into());

    a.start_round(ids(&["A", "B"])).unwrap();
    // B writes first but the line is credited to A, who is due.
    let LineOutcome::Added(line) = b.add_line("B typed this").unwrap() else {
        panic!("line should be added");
    };
    assert_eq!(line.author_id, "A");
    assert_eq!(a.state().unwrap().lines.len(), 1);
}
