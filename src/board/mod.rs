//! Board-state reconstruction: detections in, FEN-ready board out.
//!
//! This is the heart of the pipeline. Given one frame's detection set, the
//! reconstructor derives the board grid from the board-marker box, drops
//! each piece detection into its cell, resolves collisions by confidence,
//! and validates the result (exactly one king per side) before the engine
//! ever sees it.

pub mod fen;

use crate::detect::{BBox, Detection, DetectionLabel};
use crate::error::GambitError;

/// Piece color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceColor {
    White,
    Black,
}

/// Piece kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// A piece: color plus kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: PieceColor,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: PieceColor, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// The FEN character for this piece (uppercase white, lowercase black).
    pub fn fen_char(&self) -> char {
        let c = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            PieceColor::White => c.to_ascii_uppercase(),
            PieceColor::Black => c,
        }
    }

    /// Parses a FEN piece character.
    pub fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            PieceColor::White
        } else {
            PieceColor::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        Some(Self { color, kind })
    }
}

/// A board square, file 0..=7 (a..=h) and rank 0..=7 (1..=8).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Creates a square from zero-based file and rank indices.
    ///
    /// Returns `None` if either index is out of range.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    /// Parses a square name such as `e4`.
    pub fn parse(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].checked_sub(b'a')?;
        let rank = bytes[1].checked_sub(b'1')?;
        Self::new(file, rank)
    }

    /// Zero-based file index (a = 0).
    #[inline]
    pub fn file(&self) -> u8 {
        self.file
    }

    /// Zero-based rank index (rank 1 = 0).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.rank
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file) as char,
            (b'1' + self.rank) as char
        )
    }
}

/// The board's pixel-space grid reference: origin plus per-cell span.
///
/// Derived from the board-marker bounding box; the playing surface is split
/// into an 8x8 grid of equal cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardGrid {
    origin_x: f64,
    origin_y: f64,
    cell_w: f64,
    cell_h: f64,
}

impl BoardGrid {
    /// Derives the grid from the board marker's bounding box.
    pub fn from_board_bbox(bbox: &BBox) -> Self {
        Self {
            origin_x: bbox.xmin,
            origin_y: bbox.ymin,
            cell_w: bbox.width() / 8.0,
            cell_h: bbox.height() / 8.0,
        }
    }

    /// Maps a pixel point to the square it falls in.
    ///
    /// Pixel y grows downward while ranks grow upward, so the top row of
    /// cells is rank 8. Returns `None` for points outside the 8x8 grid,
    /// which classifies stray detections near the board edge as noise.
    pub fn square_at(&self, x: f64, y: f64) -> Option<Square> {
        if self.cell_w <= 0.0 || self.cell_h <= 0.0 {
            return None;
        }
        let col = ((x - self.origin_x) / self.cell_w).floor();
        let row = ((y - self.origin_y) / self.cell_h).floor();
        if !(0.0..8.0).contains(&col) || !(0.0..8.0).contains(&row) {
            return None;
        }
        Square::new(col as u8, 7 - row as u8)
    }
}

/// A reconstructed board: 8x8 occupancy plus the FEN bookkeeping fields.
///
/// Side-to-move, castling rights, en-passant and the clocks are not
/// observable from a single frame; they carry FEN-legal defaults and the
/// pipeline is stateless across moves with respect to them.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardState {
    cells: [[Option<Piece>; 8]; 8],
    pub side_to_move: PieceColor,
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            cells: [[None; 8]; 8],
            side_to_move: PieceColor::White,
            castling: "KQkq".to_string(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl BoardState {
    /// Returns the occupant of a square.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.cells[square.rank() as usize][square.file() as usize]
    }

    /// Places (or clears) a piece on a square.
    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.cells[square.rank() as usize][square.file() as usize] = piece;
    }

    /// Counts kings per side, (white, black).
    pub fn king_census(&self) -> (usize, usize) {
        let mut white = 0;
        let mut black = 0;
        for rank in &self.cells {
            for piece in rank.iter().flatten() {
                if piece.kind == PieceKind::King {
                    match piece.color {
                        PieceColor::White => white += 1,
                        PieceColor::Black => black += 1,
                    }
                }
            }
        }
        (white, black)
    }

    /// Renders the complete FEN record for this board.
    pub fn to_fen(&self) -> String {
        fen::render(self)
    }
}

/// Reconstructs a board state from one frame's detection set.
///
/// The grid comes from the highest-confidence board-marker detection.
/// Each piece detection is assigned the cell under its box's bottom-center;
/// detections that land outside the grid or carry a non-finite or inverted
/// box are dropped. When two detections claim the same cell the higher
/// confidence wins, ties going to the first seen.
///
/// # Errors
/// - [`GambitError::BoardNotFound`] when no board marker was detected.
/// - [`GambitError::MissingKings`] when the assembled board does not hold
///   exactly one king per side.
pub fn reconstruct(detections: &[Detection]) -> Result<BoardState, GambitError> {
    let grid = detections
        .iter()
        .filter(|d| d.label == DetectionLabel::Board && d.bbox.is_finite())
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        .map(|d| BoardGrid::from_board_bbox(&d.bbox))
        .ok_or(GambitError::BoardNotFound)?;

    let mut claimed: [[Option<(Piece, f64)>; 8]; 8] = [[None; 8]; 8];

    for detection in detections {
        let DetectionLabel::Piece(piece) = detection.label else {
            continue;
        };
        if !detection.bbox.is_finite() || !detection.bbox.is_ordered() {
            continue;
        }
        let (x, y) = detection.bbox.bottom_center();
        let Some(square) = grid.square_at(x, y) else {
            continue;
        };

        let cell = &mut claimed[square.rank() as usize][square.file() as usize];
        match cell {
            Some((_, held)) if *held >= detection.confidence => {}
            _ => *cell = Some((piece, detection.confidence)),
        }
    }

    let mut board = BoardState::default();
    for rank in 0..8u8 {
        for file in 0..8u8 {
            if let Some((piece, _)) = claimed[rank as usize][file as usize] {
                board.set_piece(Square::new(file, rank).unwrap(), Some(piece));
            }
        }
    }

    match board.king_census() {
        (1, 1) => Ok(board),
        (white, black) => Err(GambitError::MissingKings { white, black }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Detection;

    fn board_marker() -> Detection {
        Detection::new(
            DetectionLabel::Board,
            0.99,
            BBox::from_xyxy(0.0, 0.0, 800.0, 800.0),
        )
    }

    /// A piece detection whose box base sits in the middle of `square`,
    /// with the box extending one cell upward like a real piece.
    fn piece_on(square: &str, piece: Piece, confidence: f64) -> Detection {
        let sq = Square::parse(square).unwrap();
        let cell = 100.0;
        let cx = sq.file() as f64 * cell + cell / 2.0;
        // rank 7 (index) is the top pixel row
        let base_y = (7 - sq.rank()) as f64 * cell + cell * 0.9;
        Detection::new(
            DetectionLabel::Piece(piece),
            confidence,
            BBox::from_xyxy(cx - 30.0, base_y - 150.0, cx + 30.0, base_y),
        )
    }

    fn king(color: PieceColor) -> Piece {
        Piece::new(color, PieceKind::King)
    }

    #[test]
    fn square_parse_and_display() {
        let sq = Square::parse("e4").unwrap();
        assert_eq!(sq.file(), 4);
        assert_eq!(sq.rank(), 3);
        assert_eq!(sq.to_string(), "e4");

        assert!(Square::parse("i4").is_none());
        assert!(Square::parse("a9").is_none());
        assert!(Square::parse("a0").is_none());
        assert!(Square::parse("e44").is_none());
    }

    #[test]
    fn grid_maps_corners() {
        let grid = BoardGrid::from_board_bbox(&BBox::from_xyxy(0.0, 0.0, 800.0, 800.0));
        // Top-left cell is a8, bottom-left a1.
        assert_eq!(grid.square_at(10.0, 10.0), Some(Square::parse("a8").unwrap()));
        assert_eq!(grid.square_at(10.0, 790.0), Some(Square::parse("a1").unwrap()));
        assert_eq!(grid.square_at(790.0, 790.0), Some(Square::parse("h1").unwrap()));
    }

    #[test]
    fn grid_rejects_points_outside() {
        let grid = BoardGrid::from_board_bbox(&BBox::from_xyxy(100.0, 100.0, 900.0, 900.0));
        assert_eq!(grid.square_at(99.0, 500.0), None);
        assert_eq!(grid.square_at(901.0, 500.0), None);
        assert_eq!(grid.square_at(500.0, 99.0), None);
        assert_eq!(grid.square_at(500.0, 901.0), None);
    }

    #[test]
    fn reconstruct_places_pieces() {
        let detections = vec![
            board_marker(),
            piece_on("e1", king(PieceColor::White), 0.95),
            piece_on("e8", king(PieceColor::Black), 0.94),
            piece_on("d4", Piece::new(PieceColor::White, PieceKind::Queen), 0.9),
        ];

        let board = reconstruct(&detections).unwrap();
        assert_eq!(board.piece_at(Square::parse("e1").unwrap()), Some(king(PieceColor::White)));
        assert_eq!(board.piece_at(Square::parse("e8").unwrap()), Some(king(PieceColor::Black)));
        assert_eq!(
            board.piece_at(Square::parse("d4").unwrap()),
            Some(Piece::new(PieceColor::White, PieceKind::Queen))
        );
        assert_eq!(board.piece_at(Square::parse("a1").unwrap()), None);
    }

    #[test]
    fn reconstruct_without_board_marker_fails() {
        let detections = vec![
            piece_on("e1", king(PieceColor::White), 0.95),
            piece_on("e8", king(PieceColor::Black), 0.94),
        ];
        assert!(matches!(
            reconstruct(&detections),
            Err(GambitError::BoardNotFound)
        ));
    }

    #[test]
    fn missing_black_king_is_rejected() {
        let detections = vec![board_marker(), piece_on("e1", king(PieceColor::White), 0.95)];
        match reconstruct(&detections) {
            Err(GambitError::MissingKings { white: 1, black: 0 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn duplicate_kings_are_rejected() {
        let detections = vec![
            board_marker(),
            piece_on("e1", king(PieceColor::White), 0.95),
            piece_on("d1", king(PieceColor::White), 0.93),
            piece_on("e8", king(PieceColor::Black), 0.94),
        ];
        match reconstruct(&detections) {
            Err(GambitError::MissingKings { white: 2, black: 1 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn cell_collision_keeps_higher_confidence() {
        let weak = piece_on("d4", Piece::new(PieceColor::White, PieceKind::Bishop), 0.55);
        let strong = piece_on("d4", Piece::new(PieceColor::Black, PieceKind::Knight), 0.85);
        let detections = vec![
            board_marker(),
            weak,
            strong,
            piece_on("e1", king(PieceColor::White), 0.95),
            piece_on("e8", king(PieceColor::Black), 0.94),
        ];

        let board = reconstruct(&detections).unwrap();
        assert_eq!(
            board.piece_at(Square::parse("d4").unwrap()),
            Some(Piece::new(PieceColor::Black, PieceKind::Knight))
        );
    }

    #[test]
    fn cell_collision_tie_keeps_first_seen() {
        let first = piece_on("d4", Piece::new(PieceColor::White, PieceKind::Bishop), 0.7);
        let second = piece_on("d4", Piece::new(PieceColor::Black, PieceKind::Knight), 0.7);
        let detections = vec![
            board_marker(),
            first,
            second,
            piece_on("e1", king(PieceColor::White), 0.95),
            piece_on("e8", king(PieceColor::Black), 0.94),
        ];

        let board = reconstruct(&detections).unwrap();
        assert_eq!(
            board.piece_at(Square::parse("d4").unwrap()),
            Some(Piece::new(PieceColor::White, PieceKind::Bishop))
        );
    }

    #[test]
    fn off_grid_detection_is_dropped_as_noise() {
        let mut stray = piece_on("a1", Piece::new(PieceColor::White, PieceKind::Rook), 0.9);
        stray.bbox = BBox::from_xyxy(-80.0, 700.0, -20.0, 810.0); // base left of the board
        let detections = vec![
            board_marker(),
            stray,
            piece_on("e1", king(PieceColor::White), 0.95),
            piece_on("e8", king(PieceColor::Black), 0.94),
        ];

        let board = reconstruct(&detections).unwrap();
        assert_eq!(board.piece_at(Square::parse("a1").unwrap()), None);
    }

    #[test]
    fn bottom_center_beats_box_center_for_tall_pieces() {
        // A queen on d1 whose box reaches up past d2: the box center lies in
        // d2's cell, the base in d1's.
        let detections = vec![
            board_marker(),
            Detection::new(
                DetectionLabel::Piece(Piece::new(PieceColor::White, PieceKind::Queen)),
                0.9,
                BBox::from_xyxy(320.0, 560.0, 380.0, 790.0),
            ),
            piece_on("e1", king(PieceColor::White), 0.95),
            piece_on("e8", king(PieceColor::Black), 0.94),
        ];

        let board = reconstruct(&detections).unwrap();
        assert_eq!(
            board.piece_at(Square::parse("d1").unwrap()),
            Some(Piece::new(PieceColor::White, PieceKind::Queen))
        );
        assert_eq!(board.piece_at(Square::parse("d2").unwrap()), None);
    }
}
