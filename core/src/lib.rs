#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Robot Rescue engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Read access happens through immutable
//! views such as [`OccupancyView`] and [`GameSnapshot`].

mod geometry;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use geometry::{is_interior, is_obstacle, is_wall, CrossObstacle, OccupancyView};

/// Number of columns on the board, including the wall ring.
pub const BOARD_COLUMNS: i32 = 50;
/// Number of rows on the board, including the wall ring.
pub const BOARD_ROWS: i32 = 20;
/// Longest player name accepted for the leaderboard.
pub const MAX_NAME_LEN: usize = 20;
/// Ticks of grace granted after losing a life.
pub const INVINCIBLE_TICKS: u32 = 10;
/// Lives a new game starts with.
pub const INITIAL_LIVES: u32 = 3;
/// Rescues required to advance one level.
pub const PEOPLE_PER_LEVEL: u32 = 5;
/// Upper bound on the number of hazards the board may hold.
pub const MAX_MINES: usize = 50;
/// Hazards placed when a game starts.
pub const BASE_MINES: usize = 5;
/// Hazards added each time the level advances.
pub const MINES_PER_LEVEL: usize = 2;
/// Tick interval at level one.
pub const BASE_TICK_INTERVAL: Duration = Duration::from_millis(400);
/// Shortest tick interval the difficulty curve may reach.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(50);
/// Maximum number of trailing body segments, which also caps lives.
pub const MAX_BODY_SEGMENTS: usize = 20;
/// Score awarded for each rescued person.
pub const RESCUE_REWARD: u32 = 10;
/// Every level divisible by this stride grants an extra life.
pub const LIFE_BONUS_LEVEL_STRIDE: u32 = 5;
/// Canonical cell the agent respawns as close to as possible.
pub const SPAWN_ANCHOR: CellCoord = CellCoord::new(10, 10);
/// Seed used when no explicit seed is configured.
pub const DEFAULT_SEED: u64 = 0x5eed_0f_7e5c_0e;

/// Computes the movement interval for the provided level.
///
/// The base interval halves once per level above one and never drops below
/// [`MIN_TICK_INTERVAL`]. Level zero is treated as level one.
#[must_use]
pub fn tick_interval_for(level: u32) -> Duration {
    let mut interval = BASE_TICK_INTERVAL;
    for _ in 1..level {
        if interval <= MIN_TICK_INTERVAL {
            break;
        }
        interval /= 2;
    }
    interval.max(MIN_TICK_INTERVAL)
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Points the agent in a new direction without moving it.
    SetHeading {
        /// Heading the agent adopts.
        direction: Direction,
    },
    /// Switches between autonomous and directed control.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Moves the agent one cell along its heading, dragging its body behind it.
    AdvanceAgent,
    /// Evaluates lethal contact at the agent's head and ticks invincibility.
    ResolveCollision,
    /// Rewards the player when the agent's head stands on the target.
    ResolveRescue,
    /// Requests the area-clear extension around the agent's head.
    DetonateBomb,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that the agent adopted a new heading.
    HeadingChanged {
        /// Heading now in effect.
        direction: Direction,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active after processing commands.
        mode: PlayMode,
    },
    /// Confirms that the agent's head moved between two cells.
    AgentAdvanced {
        /// Cell the head occupied before moving.
        from: CellCoord,
        /// Cell the head occupies after moving.
        to: CellCoord,
    },
    /// Reports that lethal contact cost a life and the agent respawned.
    LifeLost {
        /// What the head touched.
        contact: LethalContact,
        /// Cell where the contact happened.
        at: CellCoord,
        /// Lives left after the loss.
        lives: u32,
        /// Cell the agent was relocated to.
        respawn: CellCoord,
    },
    /// Reports that the post-respawn grace period ended.
    InvincibilityExpired,
    /// Reports the terminal transition: the last life was lost.
    GameOver {
        /// What the head touched.
        contact: LethalContact,
        /// Final record handed to the leaderboard collaborator.
        record: LeaderboardRecord,
    },
    /// Confirms that the agent reached the rescue target.
    PersonRescued {
        /// Cell of the rescued person.
        cell: CellCoord,
        /// Score after the reward was applied.
        score: u32,
    },
    /// Announces that enough rescues accumulated to advance the level.
    LevelAdvanced {
        /// Level now in effect.
        level: u32,
    },
    /// Reports hazards added to the board, in placement order.
    HazardsPlaced {
        /// Newly placed hazard cells.
        cells: Vec<CellCoord>,
    },
    /// Reports that a level milestone granted an extra life.
    LifeGranted {
        /// Lives after the bonus was applied.
        lives: u32,
    },
    /// Reports that a fresh rescue target replaced the previous one.
    TargetRelocated {
        /// Previous target cell.
        from: CellCoord,
        /// New target cell.
        to: CellCoord,
    },
    /// Confirms that the area-clear extension removed hazards.
    BombDetonated {
        /// Hazards removed from the board.
        cleared: Vec<CellCoord>,
        /// Level after the cost was paid.
        level: u32,
    },
    /// Reports that an area-clear request was refused.
    BombRejected {
        /// Specific reason the request failed.
        reason: BombRejection,
    },
}

/// Kinds of cells that cost a life when the head lands on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LethalContact {
    /// The wall ring or anything beyond it.
    Wall,
    /// A randomly placed mine.
    Hazard,
    /// The static cross at the board centre.
    Obstacle,
}

/// Reasons an area-clear request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BombRejection {
    /// The active rules do not enable the extension.
    Disabled,
    /// The player has not yet passed the minimum level.
    LevelTooLow,
}

/// Describes who steers the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// The path planner chooses the heading every tick.
    Autonomous,
    /// Headings come from external directional input.
    Directed,
}

impl PlayMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Autonomous => Self::Directed,
            Self::Directed => Self::Autonomous,
        }
    }
}

/// Cardinal movement directions available to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Neighbour expansion order used by the path planner: +x, -x, +y, -y.
    pub const EXPANSION_ORDER: [Self; 4] = [Self::East, Self::West, Self::South, Self::North];

    /// Unit column and row delta for one step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Direction of a single orthogonal step from `from` to `to`, if there is one.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let dx = to.column() - from.column();
        let dy = to.row() - from.row();
        match (dx, dy) {
            (1, 0) => Some(Self::East),
            (-1, 0) => Some(Self::West),
            (0, 1) => Some(Self::South),
            (0, -1) => Some(Self::North),
            _ => None,
        }
    }
}

/// Location of a single board cell expressed as column and row coordinates.
///
/// Coordinates are signed: an invincible agent may walk through the wall ring
/// and off the board until its grace period ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Neighbouring cell one step away in the provided direction.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.column.saturating_add(dx), self.row.saturating_add(dy))
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Reasons a player name may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlayerNameError {
    /// The name was empty.
    #[error("player name must not be empty")]
    Empty,
    /// The name exceeded [`MAX_NAME_LEN`] characters.
    #[error("player name must be at most {max} characters, got {actual}")]
    TooLong {
        /// Longest accepted length.
        max: usize,
        /// Length that was supplied.
        actual: usize,
    },
    /// The name contained whitespace, which the leaderboard cannot store.
    #[error("player name must not contain whitespace")]
    Whitespace,
}

/// Validated name shown in the status panel and stored on the leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    /// Validates and wraps the provided name.
    pub fn new(value: impl Into<String>) -> Result<Self, PlayerNameError> {
        let value = value.into();
        if value.is_empty() {
            return Err(PlayerNameError::Empty);
        }
        let length = value.chars().count();
        if length > MAX_NAME_LEN {
            return Err(PlayerNameError::TooLong {
                max: MAX_NAME_LEN,
                actual: length,
            });
        }
        if value.chars().any(char::is_whitespace) {
            return Err(PlayerNameError::Whitespace);
        }
        Ok(Self(value))
    }

    /// Borrowed string form of the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerName {
    type Error = PlayerNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlayerName> for String {
    fn from(name: PlayerName) -> Self {
        name.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Player progress record: score, lives, level and rescues toward the next level.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Progress {
    /// Name entered before the game started.
    pub name: PlayerName,
    /// Accumulated score.
    pub score: u32,
    /// Remaining lives, bounded by [`MAX_BODY_SEGMENTS`].
    pub lives: u32,
    /// Current level, starting at one.
    pub level: u32,
    /// Rescues counted toward the next level.
    pub rescued: u32,
}

impl Progress {
    /// Fresh record for a new game.
    #[must_use]
    pub fn new(name: PlayerName) -> Self {
        Self {
            name,
            score: 0,
            lives: INITIAL_LIVES,
            level: 1,
            rescued: 0,
        }
    }

    /// Leaderboard record derived from the current progress.
    #[must_use]
    pub fn record(&self) -> LeaderboardRecord {
        LeaderboardRecord {
            name: self.name.clone(),
            score: self.score,
            level: self.level,
        }
    }
}

/// Final result handed to the leaderboard collaborator when a game ends.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaderboardRecord {
    /// Player name.
    pub name: PlayerName,
    /// Final score.
    pub score: u32,
    /// Level reached.
    pub level: u32,
}

impl LeaderboardRecord {
    /// Reports whether this record beats every previously stored entry.
    ///
    /// An empty leaderboard always yields a new high score.
    #[must_use]
    pub fn is_new_high_score(&self, previous: &[LeaderboardRecord]) -> bool {
        previous
            .iter()
            .map(|entry| entry.score)
            .max()
            .map_or(true, |best| self.score > best)
    }
}

/// Rule switches fixed for the lifetime of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Seed for all placement randomness.
    pub seed: u64,
    /// Enables the area-clear extension, which may lower the level.
    pub bomb_enabled: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            bomb_enabled: false,
        }
    }
}

/// Immutable view of the agent used by renderers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Cell occupied by the head.
    pub head: CellCoord,
    /// Direction the head will move on the next tick.
    pub heading: Direction,
    /// Trailing body cells, nearest segment first.
    pub body: Vec<CellCoord>,
    /// Whether lethal contact is currently ignored.
    pub invincible: bool,
    /// Grace ticks remaining; zero when not invincible.
    pub invincible_ticks: u32,
}

/// Per-tick snapshot consumed by the rendering layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Board width in cells.
    pub columns: i32,
    /// Board height in cells.
    pub rows: i32,
    /// Static obstacle descriptor.
    pub obstacle: CrossObstacle,
    /// Hazard cells in placement order.
    pub hazards: Vec<CellCoord>,
    /// Current rescue target.
    pub target: CellCoord,
    /// Agent head, heading, body and invincibility.
    pub agent: AgentSnapshot,
    /// Player record.
    pub progress: Progress,
    /// Who steers the agent.
    pub mode: PlayMode,
    /// Whether the terminal state was reached.
    pub game_over: bool,
}
