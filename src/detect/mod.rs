//! Detection data model and detector adapters.
//!
//! A detector (an external, pretrained object-detection model) reports one
//! [`Detection`] per object it finds in a captured frame: the board marker
//! itself, or a piece with its color and kind. This module defines those
//! types and the [`BoardDetector`] capability trait; the board module turns
//! a detection set into a board state.
//!
//! # Design principles
//!
//! 1. **Permissive construction**: a [`Detection`] may carry a malformed or
//!    off-board bounding box. The reconstructor classifies and drops such
//!    boxes; parsing never panics over geometry.
//!
//! 2. **Opaque model boundary**: the detector is a classifier/locator this
//!    crate does not reimplement. Adapters either read a JSON export or run
//!    an external detector process.

mod bbox;
pub mod io_json;
mod source;

pub use bbox::BBox;
pub use source::{BoardDetector, DetectionFile, DetectorCommand};

use serde::{Deserialize, Serialize};

use crate::board::{Piece, PieceColor, PieceKind};
use crate::error::GambitError;

/// The class label of a single detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionLabel {
    /// The board marker: the detector boxes the playing surface itself so
    /// the grid origin and cell span can be derived.
    Board,
    /// A piece with known color and kind.
    Piece(Piece),
}

impl DetectionLabel {
    /// Parses the label text emitted by the detection model.
    ///
    /// The model's class names are `Chess_Board` plus `<Color>_<Kind>`
    /// pairs such as `White_Pawn` or `Black_Queen`.
    pub fn parse(label: &str) -> Result<Self, GambitError> {
        if label == "Chess_Board" {
            return Ok(DetectionLabel::Board);
        }

        let (color_str, kind_str) = label
            .split_once('_')
            .ok_or_else(|| GambitError::UnknownLabel(label.to_string()))?;

        let color = match color_str {
            "White" => PieceColor::White,
            "Black" => PieceColor::Black,
            _ => return Err(GambitError::UnknownLabel(label.to_string())),
        };
        let kind = match kind_str {
            "Pawn" => PieceKind::Pawn,
            "Knight" => PieceKind::Knight,
            "Bishop" => PieceKind::Bishop,
            "Rook" => PieceKind::Rook,
            "Queen" => PieceKind::Queen,
            "King" => PieceKind::King,
            _ => return Err(GambitError::UnknownLabel(label.to_string())),
        };

        Ok(DetectionLabel::Piece(Piece::new(color, kind)))
    }
}

/// A single detection reported for one captured frame.
///
/// Immutable once parsed; the detection set is discarded after the board
/// state has been derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// The detected class (board marker or piece).
    #[serde(with = "label_text")]
    pub label: DetectionLabel,

    /// Model confidence in [0, 1].
    pub confidence: f64,

    /// Bounding box in pixel space.
    pub bbox: BBox,
}

impl Detection {
    /// Creates a detection from parts. Mostly useful in tests.
    pub fn new(label: DetectionLabel, confidence: f64, bbox: BBox) -> Self {
        Self {
            label,
            confidence,
            bbox,
        }
    }
}

/// Serializes [`DetectionLabel`] as the model's class-name text.
mod label_text {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DetectionLabel;
    use crate::board::{PieceColor, PieceKind};

    pub fn serialize<S: Serializer>(
        label: &DetectionLabel,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let text = match label {
            DetectionLabel::Board => "Chess_Board".to_string(),
            DetectionLabel::Piece(piece) => {
                let color = match piece.color {
                    PieceColor::White => "White",
                    PieceColor::Black => "Black",
                };
                let kind = match piece.kind {
                    PieceKind::Pawn => "Pawn",
                    PieceKind::Knight => "Knight",
                    PieceKind::Bishop => "Bishop",
                    PieceKind::Rook => "Rook",
                    PieceKind::Queen => "Queen",
                    PieceKind::King => "King",
                };
                format!("{}_{}", color, kind)
            }
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DetectionLabel, D::Error> {
        let text = String::deserialize(deserializer)?;
        DetectionLabel::parse(&text).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_board_marker_label() {
        assert_eq!(
            DetectionLabel::parse("Chess_Board").unwrap(),
            DetectionLabel::Board
        );
    }

    #[test]
    fn parses_piece_labels() {
        let label = DetectionLabel::parse("White_Knight").unwrap();
        assert_eq!(
            label,
            DetectionLabel::Piece(Piece::new(PieceColor::White, PieceKind::Knight))
        );

        let label = DetectionLabel::parse("Black_King").unwrap();
        assert_eq!(
            label,
            DetectionLabel::Piece(Piece::new(PieceColor::Black, PieceKind::King))
        );
    }

    #[test]
    fn rejects_unknown_labels() {
        for bad in ["", "Pawn", "White-Pawn", "Green_Pawn", "White_Dragon"] {
            assert!(
                matches!(
                    DetectionLabel::parse(bad),
                    Err(GambitError::UnknownLabel(_))
                ),
                "expected UnknownLabel for {:?}",
                bad
            );
        }
    }

    #[test]
    fn detection_label_serde_roundtrip() {
        let det = Detection::new(
            DetectionLabel::Piece(Piece::new(PieceColor::Black, PieceKind::Queen)),
            0.92,
            BBox::from_xyxy(10.0, 20.0, 60.0, 110.0),
        );
        let json = serde_json::to_string(&det).unwrap();
        assert!(json.contains("Black_Queen"));
        let back: Detection = serde_json::from_str(&json).unwrap();
        assert_eq!(det, back);
    }
}
