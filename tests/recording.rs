//! Recording files end to end.

mod common;

use common::{tables, MOUSE_RDESC};
use hidwire::recording::{Recording, ReplaySession};
use hidwire::DeviceMeta;

fn mouse_recording() -> String {
    let rdesc: Vec<String> = MOUSE_RDESC.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "# a synthetic capture\n\
         R: {} {}\n\
         N: Example Mouse\n\
         I: 3 046d c077\n\
         E: 0.000000 3 01 0a f6\n\
         E: 0.008000 3 00 00 00\n",
        MOUSE_RDESC.len(),
        rdesc.join(" ")
    )
}

#[test]
fn loads_metadata_model_and_events() {
    let rec = Recording::parse(&mouse_recording()).unwrap();
    assert_eq!(
        rec.meta,
        DeviceMeta {
            name: Some("Example Mouse".to_string()),
            bus: Some(3),
            vid: Some(0x046d),
            pid: Some(0xc077),
        }
    );
    let model = rec.model.as_ref().expect("R: line parsed");
    assert_eq!(model.reports().count(), 1);
    assert_eq!(rec.events.len(), 2);
    assert_eq!(rec.events[0].bytes, vec![0x01, 0x0a, 0xf6]);
}

#[test]
fn replay_session_streams_the_decoded_output() {
    let tables = tables();
    let mut session = ReplaySession::new();
    let mut lines = Vec::new();
    for line in mouse_recording().lines() {
        lines.extend(session.feed(line, &tables).unwrap());
    }

    // Comment first, then one listing line per item, then the two events.
    let items = session.model().unwrap().items().len();
    assert_eq!(lines.len(), 1 + items + 2);
    assert_eq!(lines[0], "# a synthetic capture");
    assert!(lines[1].starts_with("0x05, 0x01,"));
    assert!(lines[1].contains("Usage Page (Generic Desktop)"));
    assert_eq!(
        lines[1 + items],
        "  0.000000  B1: 1 | B2: 0 | B3: 0 | # | X:   10 | Y:  -10 "
    );
    assert!(!lines.iter().any(|l| l.contains("win 8")));
}

#[test]
fn collections_indent_the_listing() {
    let tables = tables();
    let mut session = ReplaySession::new();
    let mut lines = Vec::new();
    for line in mouse_recording().lines() {
        lines.extend(session.feed(line, &tables).unwrap());
    }
    // The button Usage Minimum sits two collections deep.
    let line = lines
        .iter()
        .find(|l| l.contains("Usage Minimum"))
        .expect("listing contains Usage Minimum");
    assert!(line.contains("//     Usage Minimum (1)"));
}

#[test]
fn events_before_a_descriptor_are_skipped() {
    let tables = tables();
    let mut session = ReplaySession::new();
    assert!(session.feed("E: 0.0 3 01 02 03", &tables).unwrap().is_empty());
    assert!(session.model().is_none());
}

#[test]
fn roundtrips_the_descriptor_bytes() {
    let rec = Recording::parse(&mouse_recording()).unwrap();
    assert_eq!(rec.model.unwrap().rdesc_bytes(), MOUSE_RDESC);
}

#[test]
fn length_mismatch_is_tolerated() {
    // Deliberately wrong count: the bytes win, with a logged warning.
    let rec = Recording::parse("E: 0.1 5 01 02\n").unwrap();
    assert_eq!(rec.events[0].bytes, vec![0x01, 0x02]);
}

#[test]
fn files_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mouse.hid");
    std::fs::write(&path, mouse_recording()).unwrap();
    let rec = Recording::load(&path).unwrap();
    assert_eq!(rec.events.len(), 2);
}
