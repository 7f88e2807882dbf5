#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous steering system that routes the agent toward the rescue target.

use std::collections::VecDeque;

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use robot_rescue_core::{
    CellCoord, Command, Direction, OccupancyView, PlayMode, BOARD_COLUMNS, BOARD_ROWS,
};
use tracing::{debug, warn};

/// Configuration parameters required to construct the autopilot system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration seeding the local-avoidance fallback.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that emits heading changes while the agent is autonomous.
#[derive(Debug)]
pub struct Autopilot {
    planner: PathPlanner,
}

impl Autopilot {
    /// Creates a new autopilot using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            planner: PathPlanner::new(config.rng_seed),
        }
    }

    /// Plans one step toward `target` and emits a heading command when the
    /// planned direction differs from `heading`.
    ///
    /// Nothing is emitted in directed mode or when every neighbour is blocked,
    /// in which case the agent holds its current heading.
    pub fn handle(
        &mut self,
        play_mode: PlayMode,
        head: CellCoord,
        heading: Direction,
        target: CellCoord,
        view: &OccupancyView<'_>,
        out: &mut Vec<Command>,
    ) {
        if play_mode != PlayMode::Autonomous {
            return;
        }

        let Some(direction) = self.planner.next_direction(head, target, view) else {
            return;
        };

        if direction != heading {
            out.push(Command::SetHeading { direction });
        }
    }
}

/// Breadth-first planner over the live occupancy grid.
///
/// The search arena is sized to the board once and reused every tick. Each
/// visited cell remembers the first step taken from the start cell, so the
/// answer is read straight off the target without walking parents back.
#[derive(Debug)]
pub struct PathPlanner {
    first_steps: Vec<Option<Direction>>,
    visited: Vec<bool>,
    queue: VecDeque<CellCoord>,
    rng: ChaCha8Rng,
}

impl PathPlanner {
    /// Creates a planner whose fallback ordering is drawn from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let cells = cell_count();
        Self {
            first_steps: vec![None; cells],
            visited: vec![false; cells],
            queue: VecDeque::with_capacity(cells),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Direction for the agent's next move.
    ///
    /// Follows a shortest path when one exists. Otherwise tries the cardinal
    /// directions in a random order and takes the first unblocked neighbour,
    /// returning `None` when the agent is boxed in or already on the target.
    pub fn next_direction(
        &mut self,
        head: CellCoord,
        target: CellCoord,
        view: &OccupancyView<'_>,
    ) -> Option<Direction> {
        if head == target {
            return None;
        }

        if let Some(direction) = self.shortest_path_step(head, target, view) {
            debug!(%head, %target, ?direction, "planned shortest path step");
            return Some(direction);
        }

        let fallback = self.avoidance_step(head, view);
        match fallback {
            Some(direction) => debug!(%head, %target, ?direction, "target unreachable, wandering"),
            None => warn!(%head, "agent boxed in, holding heading"),
        }
        fallback
    }

    /// First step of a shortest 4-connected path from `start` to `goal`.
    ///
    /// Blocked cells are never expanded; the start cell itself is, so an agent
    /// standing on a hazard while invincible can still route out. Neighbours
    /// are expanded in [`Direction::EXPANSION_ORDER`].
    pub fn shortest_path_step(
        &mut self,
        start: CellCoord,
        goal: CellCoord,
        view: &OccupancyView<'_>,
    ) -> Option<Direction> {
        let start_index = index(start)?;
        let goal_index = index(goal)?;
        if start_index == goal_index {
            return None;
        }

        self.first_steps.fill(None);
        self.visited.fill(false);
        self.queue.clear();

        self.visited[start_index] = true;
        self.queue.push_back(start);

        while let Some(cell) = self.queue.pop_front() {
            let Some(cell_index) = index(cell) else {
                continue;
            };
            let inherited = self.first_steps[cell_index];

            for direction in Direction::EXPANSION_ORDER {
                let neighbor = cell.offset(direction);
                let Some(neighbor_index) = index(neighbor) else {
                    continue;
                };
                if self.visited[neighbor_index] || view.is_blocked(neighbor) {
                    continue;
                }

                self.visited[neighbor_index] = true;
                let step = inherited.or(Some(direction));
                self.first_steps[neighbor_index] = step;

                if neighbor_index == goal_index {
                    return step;
                }
                self.queue.push_back(neighbor);
            }
        }

        None
    }

    fn avoidance_step(&mut self, head: CellCoord, view: &OccupancyView<'_>) -> Option<Direction> {
        let mut candidates = Direction::EXPANSION_ORDER;
        candidates.shuffle(&mut self.rng);
        candidates
            .into_iter()
            .find(|direction| !view.is_blocked(head.offset(*direction)))
    }
}

fn cell_count() -> usize {
    let columns = usize::try_from(BOARD_COLUMNS).unwrap_or(0);
    let rows = usize::try_from(BOARD_ROWS).unwrap_or(0);
    columns.saturating_mul(rows)
}

fn index(cell: CellCoord) -> Option<usize> {
    if !(0..BOARD_COLUMNS).contains(&cell.column()) || !(0..BOARD_ROWS).contains(&cell.row()) {
        return None;
    }
    usize::try_from(cell.row() * BOARD_COLUMNS + cell.column()).ok()
}
