#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Robot Rescue.
//!
//! The world owns the hazard set, the rescue target, the agent and the
//! player's progress. Nothing outside this crate mutates them: callers submit
//! [`Command`] values to [`apply`] and observe the resulting [`Event`] values,
//! and read state through the [`query`] module.

pub mod agent;
pub mod bomb;
pub mod collision;
pub mod placement;
pub mod progression;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use robot_rescue_core::{
    BombRejection, CellCoord, Command, CrossObstacle, Direction, Event, GameRules, OccupancyView,
    PlayMode, PlayerName, Progress, BASE_MINES, MAX_MINES, SPAWN_ANCHOR,
};
use tracing::{debug, info};

use self::agent::Agent;

/// Explicit starting layout used to stage deterministic scenarios and replays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Cell the agent's head starts on.
    pub head: CellCoord,
    /// Initial heading.
    pub heading: Direction,
    /// Hazard cells in placement order.
    pub hazards: Vec<CellCoord>,
    /// Initial rescue target.
    pub target: CellCoord,
    /// Initial player record; the body is sized from its lives.
    pub progress: Progress,
}

/// Represents the authoritative Robot Rescue world state.
#[derive(Debug)]
pub struct World {
    rules: GameRules,
    obstacle: CrossObstacle,
    hazards: Vec<CellCoord>,
    target: CellCoord,
    agent: Agent,
    progress: Progress,
    mode: PlayMode,
    game_over: bool,
    rng: ChaCha8Rng,
}

impl World {
    /// Starts a new game for the named player.
    ///
    /// The agent spawns next to the anchor heading west under autonomous
    /// control, then a target is placed, then the initial hazards.
    #[must_use]
    pub fn new(name: PlayerName, rules: GameRules) -> Self {
        let obstacle = CrossObstacle::centered();
        let mut rng = ChaCha8Rng::seed_from_u64(rules.seed);
        let progress = Progress::new(name);

        let spawn = placement::find_safe_spawn(&[], &obstacle, SPAWN_ANCHOR);
        let mut agent = Agent::new(spawn, Direction::West);
        agent.resize_body_from_lives(progress.lives);

        let mut hazards = Vec::with_capacity(MAX_MINES);
        let target = placement::place_target(&mut rng, spawn, &hazards, &obstacle);
        let _ = placement::place_hazards(&mut rng, &mut hazards, BASE_MINES, spawn, target, &obstacle);

        info!(
            player = %progress.name,
            seed = rules.seed,
            %spawn,
            %target,
            hazards = hazards.len(),
            "game started"
        );

        Self {
            rules,
            obstacle,
            hazards,
            target,
            agent,
            progress,
            mode: PlayMode::Autonomous,
            game_over: false,
            rng,
        }
    }

    /// Starts a game from an explicit layout instead of random placement.
    ///
    /// Later placements still draw from the seeded generator in `rules`.
    ///
    /// # Panics
    ///
    /// Panics if the target or head sits on a hazard or the obstacle, or if
    /// the layout holds more than [`MAX_MINES`] hazards.
    #[must_use]
    pub fn with_layout(layout: Layout, rules: GameRules) -> Self {
        let obstacle = CrossObstacle::centered();
        assert!(
            !layout.hazards.contains(&layout.target) && !obstacle.contains(layout.target),
            "layout target overlaps a blocked cell"
        );
        assert!(
            !layout.hazards.contains(&layout.head) && !obstacle.contains(layout.head),
            "layout head overlaps a blocked cell"
        );
        assert!(
            layout.hazards.len() <= MAX_MINES,
            "layout exceeds the hazard limit"
        );

        let mut agent = Agent::new(layout.head, layout.heading);
        agent.resize_body_from_lives(layout.progress.lives);

        Self {
            rules,
            obstacle,
            hazards: layout.hazards,
            target: layout.target,
            agent,
            progress: layout.progress,
            mode: PlayMode::Autonomous,
            game_over: false,
            rng: ChaCha8Rng::seed_from_u64(rules.seed),
        }
    }

    fn occupancy(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.obstacle, &self.hazards)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands received after the game is over are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.game_over {
        debug!(?command, "ignoring command after game over");
        return;
    }

    match command {
        Command::SetHeading { direction } => {
            if world.agent.heading() != direction {
                world.agent.set_heading(direction);
                out_events.push(Event::HeadingChanged { direction });
            }
        }
        Command::SetPlayMode { mode } => {
            if world.mode != mode {
                world.mode = mode;
                info!(?mode, "play mode changed");
                out_events.push(Event::PlayModeChanged { mode });
            }
        }
        Command::AdvanceAgent => {
            let from = world.agent.advance();
            let to = world.agent.head();
            out_events.push(Event::AgentAdvanced { from, to });
        }
        Command::ResolveCollision => resolve_collision(world, out_events),
        Command::ResolveRescue => resolve_rescue(world, out_events),
        Command::DetonateBomb => detonate_bomb(world, out_events),
    }
}

fn resolve_collision(world: &mut World, out_events: &mut Vec<Event>) {
    let at = world.agent.head();
    let view = OccupancyView::new(&world.obstacle, &world.hazards);
    let outcome = collision::resolve(&mut world.agent, &mut world.progress, &view);

    if outcome.invincibility_expired {
        debug!("invincibility expired");
        out_events.push(Event::InvincibilityExpired);
    }

    let Some(contact) = outcome.contact else {
        return;
    };

    if outcome.game_over {
        world.game_over = true;
        let record = world.progress.record();
        info!(
            ?contact,
            score = record.score,
            level = record.level,
            "game over"
        );
        out_events.push(Event::GameOver { contact, record });
    } else if let Some(respawn) = outcome.respawn {
        info!(
            ?contact,
            lives = world.progress.lives,
            %respawn,
            "life lost"
        );
        out_events.push(Event::LifeLost {
            contact,
            at,
            lives: world.progress.lives,
            respawn,
        });
    }
}

fn resolve_rescue(world: &mut World, out_events: &mut Vec<Event>) {
    if world.agent.head() != world.target {
        return;
    }

    let rescued_at = world.target;
    let outcome = progression::on_rescue(
        &mut world.rng,
        &mut world.progress,
        &mut world.agent,
        &mut world.hazards,
        rescued_at,
        &world.obstacle,
    );
    debug!(cell = %rescued_at, score = world.progress.score, "person rescued");
    out_events.push(Event::PersonRescued {
        cell: rescued_at,
        score: world.progress.score,
    });

    if let Some(level) = outcome.level_advanced {
        info!(level, hazards = world.hazards.len(), "level advanced");
        out_events.push(Event::LevelAdvanced { level });
    }
    if !outcome.placed_hazards.is_empty() {
        out_events.push(Event::HazardsPlaced {
            cells: outcome.placed_hazards,
        });
    }
    if let Some(lives) = outcome.life_granted {
        info!(lives, "bonus life granted");
        out_events.push(Event::LifeGranted { lives });
    }

    world.target = placement::place_target(
        &mut world.rng,
        world.agent.head(),
        &world.hazards,
        &world.obstacle,
    );
    out_events.push(Event::TargetRelocated {
        from: rescued_at,
        to: world.target,
    });
}

fn detonate_bomb(world: &mut World, out_events: &mut Vec<Event>) {
    if !world.rules.bomb_enabled {
        out_events.push(Event::BombRejected {
            reason: BombRejection::Disabled,
        });
        return;
    }

    match bomb::detonate(&mut world.progress, world.agent.head(), &mut world.hazards) {
        Ok(cleared) => {
            info!(
                cleared = cleared.len(),
                level = world.progress.level,
                "bomb detonated"
            );
            out_events.push(Event::BombDetonated {
                cleared,
                level: world.progress.level,
            });
        }
        Err(reason) => out_events.push(Event::BombRejected { reason }),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use robot_rescue_core::{
        tick_interval_for, AgentSnapshot, CellCoord, CrossObstacle, Direction, GameRules,
        GameSnapshot, LeaderboardRecord, OccupancyView, PlayMode, Progress, BOARD_COLUMNS,
        BOARD_ROWS,
    };

    use super::{collision::Vitality, World};

    /// Read-only view combining the obstacle with the live hazard set.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.occupancy()
    }

    /// Static obstacle at the board centre.
    #[must_use]
    pub fn obstacle(world: &World) -> &CrossObstacle {
        &world.obstacle
    }

    /// Hazard cells in placement order.
    #[must_use]
    pub fn hazards(world: &World) -> &[CellCoord] {
        &world.hazards
    }

    /// Current rescue target.
    #[must_use]
    pub fn target(world: &World) -> CellCoord {
        world.target
    }

    /// Cell occupied by the agent's head.
    #[must_use]
    pub fn agent_head(world: &World) -> CellCoord {
        world.agent.head()
    }

    /// Direction the agent will move on the next advance.
    #[must_use]
    pub fn agent_heading(world: &World) -> Direction {
        world.agent.heading()
    }

    /// Trailing body cells, nearest to the head first.
    #[must_use]
    pub fn agent_body(world: &World) -> &[CellCoord] {
        world.agent.body()
    }

    /// Collision state of the agent.
    #[must_use]
    pub fn vitality(world: &World) -> Vitality {
        world.agent.vitality()
    }

    /// Player record.
    #[must_use]
    pub fn progress(world: &World) -> &Progress {
        &world.progress
    }

    /// Who currently steers the agent.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.mode
    }

    /// Rules the world was created with.
    #[must_use]
    pub fn rules(world: &World) -> GameRules {
        world.rules
    }

    /// Whether the terminal state was reached.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Movement interval for the current level.
    #[must_use]
    pub fn tick_interval(world: &World) -> Duration {
        tick_interval_for(world.progress.level)
    }

    /// Final leaderboard record, available once the game is over.
    #[must_use]
    pub fn final_record(world: &World) -> Option<LeaderboardRecord> {
        world.game_over.then(|| world.progress.record())
    }

    /// Captures the full state consumed by the rendering layer.
    #[must_use]
    pub fn snapshot(world: &World) -> GameSnapshot {
        let vitality = world.agent.vitality();
        GameSnapshot {
            columns: BOARD_COLUMNS,
            rows: BOARD_ROWS,
            obstacle: world.obstacle,
            hazards: world.hazards.clone(),
            target: world.target,
            agent: AgentSnapshot {
                head: world.agent.head(),
                heading: world.agent.heading(),
                body: world.agent.body().to_vec(),
                invincible: vitality.is_invincible(),
                invincible_ticks: vitality.ticks_remaining(),
            },
            progress: world.progress.clone(),
            mode: world.mode,
            game_over: world.game_over,
        }
    }
}
