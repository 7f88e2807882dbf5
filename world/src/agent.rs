//! Agent head, heading and trailing body.

use robot_rescue_core::{CellCoord, Direction, BOARD_COLUMNS, BOARD_ROWS, MAX_BODY_SEGMENTS};

use crate::collision::Vitality;

/// The rescue robot: a head that moves one cell per tick and a body that
/// replays where the head used to be.
///
/// Body segments are not simulated. Segment `i` simply holds the head's
/// position from `i + 1` ticks ago, clipped to the current body length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    head: CellCoord,
    heading: Direction,
    body: Vec<CellCoord>,
    vitality: Vitality,
}

impl Agent {
    /// Creates a bodiless agent at the provided cell.
    #[must_use]
    pub fn new(head: CellCoord, heading: Direction) -> Self {
        Self {
            head,
            heading,
            body: Vec::with_capacity(MAX_BODY_SEGMENTS),
            vitality: Vitality::Safe,
        }
    }

    /// Cell occupied by the head. The only cell that collides.
    #[must_use]
    pub const fn head(&self) -> CellCoord {
        self.head
    }

    /// Direction the head moves on the next advance.
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }

    /// Trailing segments, nearest to the head first.
    #[must_use]
    pub fn body(&self) -> &[CellCoord] {
        &self.body
    }

    /// Current collision state.
    #[must_use]
    pub const fn vitality(&self) -> Vitality {
        self.vitality
    }

    pub(crate) fn set_vitality(&mut self, vitality: Vitality) {
        self.vitality = vitality;
    }

    /// Points the head in a new direction without moving it.
    pub fn set_heading(&mut self, direction: Direction) {
        self.heading = direction;
    }

    /// Moves the head one cell along its heading and returns the cell it left.
    ///
    /// Every segment takes its predecessor's position, tail first, and the
    /// foremost segment takes the head's pre-move position.
    pub fn advance(&mut self) -> CellCoord {
        let from = self.head;
        if !self.body.is_empty() {
            self.body.rotate_right(1);
            self.body[0] = from;
        }
        self.head = from.offset(self.heading);
        from
    }

    /// Teleports the head without touching the body.
    pub fn relocate(&mut self, cell: CellCoord) {
        self.head = cell;
    }

    /// Rebuilds the body so it holds one segment per remaining life.
    ///
    /// Segments are laid out behind the head along the reverse heading. A
    /// segment that would land on the wall or the ring next to it takes the
    /// head's own cell instead.
    pub fn resize_body_from_lives(&mut self, lives: u32) {
        let length = usize::try_from(lives)
            .unwrap_or(MAX_BODY_SEGMENTS)
            .min(MAX_BODY_SEGMENTS);
        let (dx, dy) = self.heading.delta();
        let head = self.head;

        self.body.clear();
        self.body.extend((1..=length).map(|step| {
            let step = i32::try_from(step).unwrap_or(i32::MAX);
            let column = head.column().saturating_sub(dx.saturating_mul(step));
            let row = head.row().saturating_sub(dy.saturating_mul(step));
            if column <= 1 || column >= BOARD_COLUMNS - 2 || row <= 1 || row >= BOARD_ROWS - 2 {
                head
            } else {
                CellCoord::new(column, row)
            }
        }));
    }
}
