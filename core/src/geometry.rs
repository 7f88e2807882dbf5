//! Static board geometry and occupancy tests.
//!
//! Everything in this module is pure: the wall ring and the cross obstacle
//! never change after a game starts, and the hazard set is only ever read
//! through an [`OccupancyView`].

use serde::{Deserialize, Serialize};

use crate::{CellCoord, BOARD_COLUMNS, BOARD_ROWS};

const OBSTACLE_WIDTH: i32 = 11;
const OBSTACLE_HEIGHT: i32 = 11;

/// Reports whether the cell lies on the one-cell wall ring or outside the board.
#[must_use]
pub const fn is_wall(cell: CellCoord) -> bool {
    let column = cell.column();
    let row = cell.row();
    column <= 0 || column >= BOARD_COLUMNS - 1 || row <= 0 || row >= BOARD_ROWS - 1
}

/// Reports whether the cell lies inside the board's playable interior.
#[must_use]
pub const fn is_interior(cell: CellCoord) -> bool {
    !is_wall(cell)
}

/// Reports whether the cell lies on either arm of the cross obstacle.
#[must_use]
pub const fn is_obstacle(obstacle: &CrossObstacle, cell: CellCoord) -> bool {
    obstacle.contains(cell)
}

/// Static cross-shaped obstacle anchored at a centre cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossObstacle {
    center: CellCoord,
    half_width: i32,
    half_height: i32,
}

impl CrossObstacle {
    /// Creates a cross with explicit centre and half extents.
    #[must_use]
    pub const fn new(center: CellCoord, half_width: i32, half_height: i32) -> Self {
        Self {
            center,
            half_width,
            half_height,
        }
    }

    /// The canonical 11x11 cross placed in the middle of the board.
    #[must_use]
    pub const fn centered() -> Self {
        Self::new(
            CellCoord::new(BOARD_COLUMNS / 2, BOARD_ROWS / 2),
            OBSTACLE_WIDTH / 2,
            OBSTACLE_HEIGHT / 2,
        )
    }

    /// Cell where both arms intersect.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        self.center
    }

    /// Number of cells the horizontal arm extends on each side of the centre.
    #[must_use]
    pub const fn half_width(&self) -> i32 {
        self.half_width
    }

    /// Number of cells the vertical arm extends on each side of the centre.
    #[must_use]
    pub const fn half_height(&self) -> i32 {
        self.half_height
    }

    /// Reports whether the cell lies on the horizontal or vertical arm.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        let cx = self.center.column();
        let cy = self.center.row();
        let on_horizontal = cell.row() == cy
            && cell.column() >= cx - self.half_width
            && cell.column() <= cx + self.half_width;
        let on_vertical = cell.column() == cx
            && cell.row() >= cy - self.half_height
            && cell.row() <= cy + self.half_height;
        on_horizontal || on_vertical
    }
}

impl Default for CrossObstacle {
    fn default() -> Self {
        Self::centered()
    }
}

/// Read-only view combining static geometry with the live hazard set.
///
/// Hazard membership is a linear scan. The set is capped at
/// [`crate::MAX_MINES`] entries, so a scan beats hashing at this size.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    obstacle: &'a CrossObstacle,
    hazards: &'a [CellCoord],
}

impl<'a> OccupancyView<'a> {
    /// Captures a view over the provided obstacle and hazard cells.
    #[must_use]
    pub const fn new(obstacle: &'a CrossObstacle, hazards: &'a [CellCoord]) -> Self {
        Self { obstacle, hazards }
    }

    /// Obstacle the view tests against.
    #[must_use]
    pub const fn obstacle(&self) -> &'a CrossObstacle {
        self.obstacle
    }

    /// Hazard cells the view tests against, in placement order.
    #[must_use]
    pub const fn hazards(&self) -> &'a [CellCoord] {
        self.hazards
    }

    /// Reports whether a hazard occupies the cell.
    #[must_use]
    pub fn is_hazard_at(&self, cell: CellCoord) -> bool {
        self.hazards.iter().any(|hazard| *hazard == cell)
    }

    /// Reports whether the cell is a wall, part of the obstacle, or a hazard.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        is_wall(cell) || is_obstacle(self.obstacle, cell) || self.is_hazard_at(cell)
    }

    /// Inverse of [`OccupancyView::is_blocked`].
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        !self.is_blocked(cell)
    }
}
