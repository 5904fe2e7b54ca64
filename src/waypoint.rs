//! Square-to-coordinate table and waypoint planning.
//!
//! The table maps each square name to the arm-frame position of that square
//! on the physical board; it is loaded once from CSV and read-only for the
//! life of the process. The planner turns a UCI move into the fixed
//! pick-and-place waypoint skeleton consumed by the external motion
//! controller.
//!
//! # Table CSV format
//!
//! One row per square, coordinates in meters in the arm's base frame:
//!
//! ```csv
//! square,x,y,z
//! a1,0.275,-0.175,0.012
//! a2,0.325,-0.175,0.012
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::UciMove;
use crate::error::GambitError;

/// The arm's home position, matching the motion controller's rest pose.
pub const HOME: Position = Position {
    x: 0.45,
    y: 0.0,
    z: 0.49,
};

/// Vertical clearance for approach waypoints, meters. Approaching from
/// straight above keeps the gripper out of neighboring pieces.
pub const DEFAULT_CLEARANCE: f64 = 0.08;

/// Gripper closure as a fraction of full travel. A tuned constant, the
/// same for every piece; it is not derived from detected piece geometry.
pub const GRIP_CLOSE_FRACTION: f64 = 0.55;

/// A position in the arm's base frame, meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The same position lifted by `clearance` along z.
    pub fn raised(&self, clearance: f64) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: self.z + clearance,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Matches the motion controller's expected vector syntax.
        write!(f, "[{:.3}; {:.3}; {:.3}]", self.x, self.y, self.z)
    }
}

// ============================================================================
// Coordinate table
// ============================================================================

/// A single row of the coordinate table CSV.
#[derive(Debug, Serialize, Deserialize)]
struct TableRow {
    square: String,
    x: f64,
    y: f64,
    z: f64,
}

/// The static square-name → position mapping.
#[derive(Clone, Debug)]
pub struct CoordinateTable {
    squares: BTreeMap<String, Position>,
}

impl CoordinateTable {
    /// Loads the table from a CSV file.
    ///
    /// A table covering fewer than all 64 squares loads fine (every miss
    /// is a hard `UnknownSquare` later, so a warning is printed), but a
    /// duplicate square row is a load error: silently keeping either row
    /// would hide a data-entry mistake in the table.
    pub fn load(path: &Path) -> Result<Self, GambitError> {
        let file = File::open(path).map_err(GambitError::Io)?;
        let reader = BufReader::new(file);
        let table = Self::from_reader(csv::Reader::from_reader(reader), path)?;

        if table.len() < 64 {
            println!(
                "Warning: coordinate table {} covers {} of 64 squares",
                path.display(),
                table.len()
            );
        }
        Ok(table)
    }

    /// Reads a table from a CSV string. Useful for testing without file I/O.
    pub fn from_csv_str(csv_str: &str) -> Result<Self, GambitError> {
        Self::from_reader(
            csv::Reader::from_reader(csv_str.as_bytes()),
            Path::new("<string>"),
        )
    }

    fn from_reader<R: std::io::Read>(
        mut reader: csv::Reader<R>,
        path: &Path,
    ) -> Result<Self, GambitError> {
        let mut squares = BTreeMap::new();

        for result in reader.deserialize() {
            let row: TableRow = result.map_err(|source| GambitError::TableParse {
                path: path.to_path_buf(),
                source,
            })?;
            let name = row.square.trim().to_string();
            let position = Position::new(row.x, row.y, row.z);
            if squares.insert(name.clone(), position).is_some() {
                return Err(GambitError::DuplicateSquare(name));
            }
        }

        Ok(Self { squares })
    }

    /// Looks up a square's position.
    ///
    /// # Errors
    /// [`GambitError::UnknownSquare`]: the square is absent from the table.
    /// For a standard board the table is expected to be complete, so a miss
    /// is a data-entry gap, not a condition to silently default.
    pub fn position_of(&self, square: &str) -> Result<Position, GambitError> {
        self.squares
            .get(square)
            .copied()
            .ok_or_else(|| GambitError::UnknownSquare(square.to_string()))
    }

    /// Number of squares in the table.
    pub fn len(&self) -> usize {
        self.squares.len()
    }

    /// True if the table holds no squares.
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }
}

// ============================================================================
// Waypoint planning
// ============================================================================

/// The role of a waypoint in the pick-and-place skeleton.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaypointKind {
    Home,
    PickApproach,
    Pick,
    PlaceApproach,
    Place,
}

impl std::fmt::Display for WaypointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WaypointKind::Home => "home",
            WaypointKind::PickApproach => "pick-approach",
            WaypointKind::Pick => "pick",
            WaypointKind::PlaceApproach => "place-approach",
            WaypointKind::Place => "place",
        };
        f.write_str(name)
    }
}

/// What the gripper does on arrival at a waypoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GripperCommand {
    /// Keep the current closure.
    Hold,
    /// Close to the given fraction of full travel.
    Close(f64),
    /// Open fully.
    Open,
}

/// One waypoint of the sequence handed to the motion controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub kind: WaypointKind,
    pub position: Position,
    pub gripper: GripperCommand,
}

impl std::fmt::Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.position)?;
        match self.gripper {
            GripperCommand::Hold => Ok(()),
            GripperCommand::Close(fraction) => write!(f, " grip close {:.2}", fraction),
            GripperCommand::Open => write!(f, " grip open"),
        }
    }
}

/// Plans the waypoint sequence for a move.
///
/// The skeleton is fixed and must not be reordered: home, pick-approach,
/// pick, home, place-approach, place, home. The returns to home between
/// pick and place keep the carried piece clear of everything else on the
/// board.
///
/// # Errors
/// [`GambitError::UnknownSquare`] when either move square is absent from
/// the table.
pub fn plan_move(
    mv: &UciMove,
    table: &CoordinateTable,
    clearance: f64,
) -> Result<Vec<Waypoint>, GambitError> {
    let pick = table.position_of(&mv.from.to_string())?;
    let place = table.position_of(&mv.to.to_string())?;

    Ok(vec![
        Waypoint {
            kind: WaypointKind::Home,
            position: HOME,
            gripper: GripperCommand::Open,
        },
        Waypoint {
            kind: WaypointKind::PickApproach,
            position: pick.raised(clearance),
            gripper: GripperCommand::Hold,
        },
        Waypoint {
            kind: WaypointKind::Pick,
            position: pick,
            gripper: GripperCommand::Close(GRIP_CLOSE_FRACTION),
        },
        Waypoint {
            kind: WaypointKind::Home,
            position: HOME,
            gripper: GripperCommand::Hold,
        },
        Waypoint {
            kind: WaypointKind::PlaceApproach,
            position: place.raised(clearance),
            gripper: GripperCommand::Hold,
        },
        Waypoint {
            kind: WaypointKind::Place,
            position: place,
            gripper: GripperCommand::Open,
        },
        Waypoint {
            kind: WaypointKind::Home,
            position: HOME,
            gripper: GripperCommand::Hold,
        },
    ])
}
