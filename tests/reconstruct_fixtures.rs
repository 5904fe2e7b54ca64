//! Library-level checks over the shared detection fixtures.

use std::path::Path;

use gambit::board;
use gambit::detect::io_json::read_detections;
use gambit::error::GambitError;
use gambit::waypoint::CoordinateTable;

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[test]
fn startpos_fixture_reconstructs_to_the_starting_position() {
    let detections =
        read_detections(Path::new("tests/fixtures/startpos_detections.json")).unwrap();
    assert_eq!(detections.len(), 33); // board marker + 32 pieces

    let board = board::reconstruct(&detections).unwrap();
    assert_eq!(board.to_fen(), STARTPOS);
}

#[test]
fn startpos_fixture_round_trips_through_the_fen_parser() {
    let detections =
        read_detections(Path::new("tests/fixtures/startpos_detections.json")).unwrap();
    let board = board::reconstruct(&detections).unwrap();

    let reparsed = board::fen::parse(&board.to_fen()).unwrap();
    assert_eq!(reparsed, board);
}

#[test]
fn missing_kings_fixture_is_rejected() {
    let detections = read_detections(Path::new("tests/fixtures/missing_kings.json")).unwrap();
    match board::reconstruct(&detections) {
        Err(GambitError::MissingKings { white: 0, black: 0 }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn squares_fixture_covers_the_whole_board() {
    let table = CoordinateTable::load(Path::new("tests/fixtures/squares.csv")).unwrap();
    assert_eq!(table.len(), 64);
    for file in b'a'..=b'h' {
        for rank in b'1'..=b'8' {
            let name = format!("{}{}", file as char, rank as char);
            assert!(table.position_of(&name).is_ok(), "missing {}", name);
        }
    }
}
