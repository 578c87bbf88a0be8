//! Circular text search over a parsed log.

use winelog::model::LogEntry;
use winelog::parser::parse_str;
use winelog::state::{find, LogFilter, SearchDirection, SearchOptions, SearchQuery};

const LOG: &str = "\
00c8:00cc:class:channel:logger message
00c8:00cc:class:channel:logger message
00c8:00cc:Call module.func(arg1,arg2) ret=ca11517e
00c8:00cc:Ret  module.func() retval=1337 ret=ca11517e
00c8:00cc:filler:filler:filler filler";

fn entries() -> Vec<LogEntry> {
    parse_str(LOG).expect("fixture parses").entries
}

fn search(
    entries: &[LogEntry],
    text: &str,
    direction: SearchDirection,
    start: Option<usize>,
) -> Option<usize> {
    let query = SearchQuery::new(text).expect("non-empty query");
    find(entries, &query, direction, start, None, SearchOptions::default())
}

#[test]
fn forward_search_finds_the_first_entry_with_the_field() {
    let entries = entries();
    for (text, expected) in [
        ("channel", 0),
        ("logger", 0),
        ("message", 0),
        ("module", 2),
        ("func", 2),
        ("arg1", 2),
        ("arg2", 2),
        ("ca11517e", 2),
        ("1337", 3),
        ("MeSSaGe", 0),
    ] {
        assert_eq!(
            search(&entries, text, SearchDirection::Next, None),
            Some(expected),
            "searching for {:?}",
            text
        );
    }
}

#[test]
fn forward_search_starts_at_the_given_index_and_wraps() {
    let entries = entries();
    for (start, expected) in [(1, 2), (2, 2), (3, 3), (4, 2)] {
        assert_eq!(
            search(&entries, "module", SearchDirection::Next, Some(start)),
            Some(expected),
            "starting at {}",
            start
        );
    }
}

#[test]
fn backward_search_finds_the_last_entry_with_the_field() {
    let entries = entries();
    for (text, expected) in [
        ("channel", 1),
        ("logger", 1),
        ("message", 1),
        ("module", 3),
        ("func", 3),
        ("ca11517e", 3),
        ("1337", 3),
        ("MeSSaGe", 1),
    ] {
        assert_eq!(
            search(&entries, text, SearchDirection::Prev, None),
            Some(expected),
            "searching for {:?}",
            text
        );
    }
}

#[test]
fn backward_search_starts_at_the_given_index_and_wraps() {
    let entries = entries();
    for (start, expected) in [(1, 3), (2, 2), (3, 3), (4, 3)] {
        assert_eq!(
            search(&entries, "module", SearchDirection::Prev, Some(start)),
            Some(expected),
            "starting at {}",
            start
        );
    }
}

#[test]
fn missing_text_is_not_found_in_either_direction() {
    let entries = entries();
    assert_eq!(search(&entries, "non-existent", SearchDirection::Next, None), None);
    assert_eq!(search(&entries, "non-existent", SearchDirection::Prev, None), None);
}

#[test]
fn arguments_are_not_searched_on_returns() {
    let entries = entries();
    // Only the call carries arguments.
    assert_eq!(search(&entries, "arg1", SearchDirection::Prev, Some(3)), Some(2));
}

#[test]
fn repeated_search_steps_through_every_match() {
    let entries = entries();
    let query = SearchQuery::new("message").unwrap();
    let direction = SearchDirection::Next;
    let filter = LogFilter::everything();

    let mut hits = Vec::new();
    let mut start = None;
    for _ in 0..3 {
        let hit = find(
            &entries,
            &query,
            direction,
            start,
            Some(&filter),
            SearchOptions::default(),
        )
        .expect("message is present");
        hits.push(hit);
        start = Some(direction.start_after(hit, entries.len()));
    }

    assert_eq!(hits, vec![0, 1, 0]);
}

#[test]
fn filtered_out_entries_are_skipped() {
    let entries = entries();
    let query = SearchQuery::new("module").unwrap();
    let filter = LogFilter {
        show_relay: false,
        ..LogFilter::everything()
    };

    let hit = find(
        &entries,
        &query,
        SearchDirection::Next,
        None,
        Some(&filter),
        SearchOptions::default(),
    );
    assert_eq!(hit, None);
}
