//! Navigation tests against the DAISY 2.02 fixture book.
//!
//! The fixture has four audio fragments (01_frontpage, 823_r, 824_s, 825_t)
//! plus an auxiliary SMIL document without audio. Its NCC is encoded in
//! Windows-1251.

use daisy_nav::{
    Direction, Error, Layout, NavItem, NavOption, Navigator, OpenOptions, TargetLookup,
};
use proptest::prelude::*;

const BOOK: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/daisy202");

fn open() -> Navigator {
    daisy_nav::open(BOOK).unwrap()
}

fn item(audio_path: &str, start_time: f64, end_time: f64, label: Option<&str>) -> NavItem {
    NavItem {
        audio_path: audio_path.to_string(),
        start_time,
        end_time,
        label: label.map(str::to_string),
    }
}

/// Follow `option` in `direction` from a position until the book runs out.
fn labels_from(
    nav: &mut Navigator,
    option: NavOption,
    direction: Direction,
    audio_path: &str,
    time: f64,
) -> Vec<String> {
    let mut labels = Vec::new();
    let mut position = (audio_path.to_string(), time);
    while let Some(item) = nav.navigate(option, direction, &position.0, position.1).unwrap() {
        labels.push(item.label.clone().unwrap_or_default());
        position = (item.audio_path, item.start_time);
    }
    labels
}

// ============================================================================
// Opening
// ============================================================================

#[test]
fn test_open_detects_layout_and_metadata() {
    let nav = open();
    assert_eq!(nav.layout(), Layout::Daisy202);

    let meta = nav.metadata();
    assert_eq!(meta.title, "Фронтпейдж 2003");
    assert_eq!(meta.authors, vec!["Иван Петров"]);
    assert_eq!(meta.identifier, "fp2003-ru");
    assert_eq!(meta.language, "ru");
    assert_eq!(meta.total_time, Some(485.0));
}

#[test]
fn test_list_audio_fragments_skips_documents_without_audio() {
    let nav = open();
    assert_eq!(
        nav.list_audio_fragments(),
        vec!["01_frontpage.mp3", "823_r.mp3", "824_s.mp3", "825_t.mp3"]
    );

    let positions: Vec<_> = nav.index().iter().map(|f| f.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4]);
    assert_eq!(nav.index().get(2).unwrap().document, "s0823.smil");
}

#[test]
fn test_unknown_fragment() {
    let mut nav = open();
    let err = nav.get_next("999_z.mp3", 0.0).unwrap_err();
    assert!(matches!(err, Error::UnknownFragment(ref path) if path == "999_z.mp3"));
}

// ============================================================================
// Phrase Navigation
// ============================================================================

#[test]
fn test_phrase_next_within_document() {
    let mut nav = open();
    let next = nav.get_next("823_r.mp3", 1.0).unwrap();
    assert_eq!(next, Some(item("823_r.mp3", 3.12, 7.442, None)));
}

#[test]
fn test_phrase_time_on_boundary_belongs_to_later_clip() {
    let mut nav = open();
    // 0.486 is the end of the first clip and the start of the second
    let next = nav.get_next("823_r.mp3", 0.486).unwrap().unwrap();
    assert_eq!(next.start_time, 3.12);
    let prev = nav.get_prev("823_r.mp3", 0.486).unwrap().unwrap();
    assert_eq!((prev.start_time, prev.end_time), (0.0, 0.486));
}

#[test]
fn test_phrase_crosses_fragments() {
    let mut nav = open();
    let next = nav.get_next("823_r.mp3", 453.0).unwrap();
    assert_eq!(next, Some(item("824_s.mp3", 0.0, 0.569, None)));

    let prev = nav.get_prev("823_r.mp3", 0.2).unwrap();
    assert_eq!(prev, Some(item("01_frontpage.mp3", 8.5, 12.0, None)));
}

#[test]
fn test_phrase_round_trip_mid_document() {
    let mut nav = open();
    let next = nav.get_next("823_r.mp3", 1.0).unwrap().unwrap();
    let back = nav.get_prev(&next.audio_path, next.start_time).unwrap().unwrap();
    assert_eq!(back, item("823_r.mp3", 0.486, 3.12, None));
}

// ============================================================================
// Heading Navigation
// ============================================================================

#[test]
fn test_heading_next_crosses_to_following_document() {
    let mut nav = open();
    nav.set_option(NavOption::Heading);
    let next = nav.get_next("823_r.mp3", 453.0).unwrap();
    assert_eq!(next, Some(item("824_s.mp3", 0.0, 0.569, Some("S"))));
}

#[test]
fn test_heading_prev_finds_heading_in_same_document() {
    let mut nav = open();
    nav.set_option(NavOption::Heading);
    let prev = nav.get_prev("823_r.mp3", 453.0).unwrap();
    assert_eq!(prev, Some(item("823_r.mp3", 0.0, 0.486, Some("R"))));
}

#[test]
fn test_heading_prev_from_heading_clip_goes_back_a_document() {
    let mut nav = open();
    nav.set_option(NavOption::Heading);
    // Auxiliary s0002.smil has no audio, so the previous fragment is 01_frontpage
    let prev = nav.get_prev("823_r.mp3", 0.2).unwrap();
    assert_eq!(prev, Some(item("01_frontpage.mp3", 7.0, 8.5, Some("Contents"))));
}

#[test]
fn test_heading_walk_forward_and_backward() {
    let mut nav = open();
    assert_eq!(
        labels_from(&mut nav, NavOption::Heading, Direction::Forward, "01_frontpage.mp3", 0.0),
        vec!["Contents", "R", "S", "T"]
    );
    assert_eq!(
        labels_from(&mut nav, NavOption::Heading, Direction::Backward, "825_t.mp3", 5.0),
        vec!["T", "S", "R", "Contents", "Frontpage"]
    );
}

#[test]
fn test_heading_with_id_attribute_lookup() {
    let options = OpenOptions::new().with_target_lookup(TargetLookup::IdAttribute);
    let mut nav = Navigator::open_with(BOOK, options).unwrap();
    nav.set_option(NavOption::Heading);
    assert_eq!(
        nav.get_next("823_r.mp3", 453.0).unwrap(),
        Some(item("824_s.mp3", 0.0, 0.569, Some("S")))
    );
    assert_eq!(
        nav.get_prev("823_r.mp3", 453.0).unwrap(),
        Some(item("823_r.mp3", 0.0, 0.486, Some("R")))
    );
}

// ============================================================================
// Page Navigation
// ============================================================================

#[test]
fn test_page_walk_skips_documents_without_pages() {
    let mut nav = open();
    assert_eq!(
        labels_from(&mut nav, NavOption::Page, Direction::Forward, "01_frontpage.mp3", 0.0),
        vec!["1", "2", "3"]
    );
}

#[test]
fn test_page_prev() {
    let mut nav = open();
    nav.set_option(NavOption::Page);
    assert_eq!(
        nav.get_prev("825_t.mp3", 5.0).unwrap(),
        Some(item("825_t.mp3", 0.612, 4.0, Some("3")))
    );
    assert_eq!(
        nav.get_prev("825_t.mp3", 0.612).unwrap(),
        Some(item("823_r.mp3", 7.442, 8.001, Some("2")))
    );
}

// ============================================================================
// Book Ends
// ============================================================================

#[test]
fn test_every_granularity_stops_at_book_ends() {
    let mut nav = open();
    for option in [NavOption::Phrase, NavOption::Heading, NavOption::Page] {
        nav.set_option(option);
        assert_eq!(nav.get_next("825_t.mp3", 9.0).unwrap(), None, "{option} next");
        assert_eq!(nav.get_prev("01_frontpage.mp3", 0.5).unwrap(), None, "{option} prev");
    }
}

// ============================================================================
// Properties
// ============================================================================

const FRAGMENT_ENDS: [(&str, f64); 4] = [
    ("01_frontpage.mp3", 12.0),
    ("823_r.mp3", 453.219),
    ("824_s.mp3", 9.75),
    ("825_t.mp3", 10.0),
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn phrase_next_moves_forward(fragment in 0usize..4, fraction in 0.0f64..1.0) {
        let (audio_path, end) = FRAGMENT_ENDS[fragment];
        let time = fraction * end;
        let mut nav = open();

        match nav.get_next(audio_path, time).unwrap() {
            Some(item) if item.audio_path == audio_path => prop_assert!(item.start_time > time),
            Some(item) => {
                prop_assert!(fragment + 1 < FRAGMENT_ENDS.len());
                prop_assert_eq!(item.audio_path.as_str(), FRAGMENT_ENDS[fragment + 1].0);
                prop_assert_eq!(item.start_time, 0.0);
            }
            None => prop_assert_eq!(fragment, FRAGMENT_ENDS.len() - 1),
        }
    }
}
