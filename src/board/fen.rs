//! FEN rendering and parsing.
//!
//! Rendering walks the board rank 8 down to rank 1, file a to h, run-length
//! encoding empty cells, then appends the bookkeeping fields. The parser
//! accepts a full six-field FEN record and exists so reconstructed boards
//! can be round-trip checked without pulling in a chess library.

use super::{BoardState, Piece, PieceColor, Square};
use crate::error::GambitError;

/// Renders the complete FEN record for a board.
pub fn render(board: &BoardState) -> String {
    let mut fen = String::with_capacity(80);

    for rank in (0..8u8).rev() {
        let mut empty_run = 0;
        for file in 0..8u8 {
            let square = Square::new(file, rank).unwrap();
            match board.piece_at(square) {
                Some(piece) => {
                    if empty_run > 0 {
                        fen.push(char::from_digit(empty_run, 10).unwrap());
                        empty_run = 0;
                    }
                    fen.push(piece.fen_char());
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            fen.push(char::from_digit(empty_run, 10).unwrap());
        }
        if rank > 0 {
            fen.push('/');
        }
    }

    let side = match board.side_to_move {
        PieceColor::White => 'w',
        PieceColor::Black => 'b',
    };
    let en_passant = board
        .en_passant
        .map(|sq| sq.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} {} {} {} {} {}",
        fen, side, board.castling, en_passant, board.halfmove_clock, board.fullmove_number
    )
}

/// Parses a full six-field FEN record back into a board state.
pub fn parse(text: &str) -> Result<BoardState, GambitError> {
    let fail = |message: &str| GambitError::FenParse {
        text: text.to_string(),
        message: message.to_string(),
    };

    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(fail("expected 6 space-separated fields"));
    }

    let mut board = BoardState::default();
    parse_placement_into(fields[0], &mut board, text)?;

    board.side_to_move = match fields[1] {
        "w" => PieceColor::White,
        "b" => PieceColor::Black,
        _ => return Err(fail("side to move must be 'w' or 'b'")),
    };

    let castling = fields[2];
    if castling != "-"
        && (castling.is_empty() || !castling.chars().all(|c| "KQkq".contains(c)))
    {
        return Err(fail("castling field must be '-' or a subset of KQkq"));
    }
    board.castling = castling.to_string();

    board.en_passant = match fields[3] {
        "-" => None,
        name => Some(Square::parse(name).ok_or_else(|| fail("bad en-passant square"))?),
    };

    board.halfmove_clock = fields[4]
        .parse()
        .map_err(|_| fail("halfmove clock must be a number"))?;
    board.fullmove_number = fields[5]
        .parse()
        .map_err(|_| fail("fullmove number must be a number"))?;

    Ok(board)
}

fn parse_placement_into(
    placement: &str,
    board: &mut BoardState,
    text: &str,
) -> Result<(), GambitError> {
    let fail = |message: String| GambitError::FenParse {
        text: text.to_string(),
        message,
    };

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(fail(format!(
            "placement has {} ranks, expected 8",
            ranks.len()
        )));
    }

    for (i, rank_text) in ranks.iter().enumerate() {
        let rank = 7 - i as u8; // first field chunk is rank 8
        let mut file = 0u8;
        for c in rank_text.chars() {
            if let Some(run) = c.to_digit(10) {
                if run == 0 || run > 8 {
                    return Err(fail(format!("bad empty-run digit '{}'", c)));
                }
                file += run as u8;
            } else {
                let piece = Piece::from_fen_char(c)
                    .ok_or_else(|| fail(format!("bad piece character '{}'", c)))?;
                let square = Square::new(file, rank)
                    .ok_or_else(|| fail(format!("rank {} overflows 8 files", rank + 1)))?;
                board.set_piece(square, Some(piece));
                file += 1;
            }
            if file > 8 {
                return Err(fail(format!("rank {} overflows 8 files", rank + 1)));
            }
        }
        if file != 8 {
            return Err(fail(format!(
                "rank {} covers {} files, expected 8",
                rank + 1,
                file
            )));
        }
    }

    Ok(())
}
