#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative per-tick game loop for Robot Rescue.
//!
//! A [`Session`] owns the world and the autopilot and runs one tick in a fixed
//! order: quit check, mode and bomb requests, heading resolution, movement,
//! collision, then the rescue check. Losing a life pauses the session until a
//! [`ContinueDecision`] arrives. Hosts either call [`Session::step`] directly,
//! feed frame times through [`Session::advance`], or hand control to
//! [`Session::run`].

mod pacer;

use std::time::{Duration, Instant};

use anyhow::Result;
use robot_rescue_core::{Command, Direction, Event, GameSnapshot, LeaderboardRecord, PlayMode};
use robot_rescue_system_autopilot::Autopilot;
use robot_rescue_world::{self as world, query, World};
use tracing::{debug, info};

pub use pacer::Pacer;

/// Discrete input gathered by the host for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Requested heading; only honoured in directed mode.
    pub direction: Option<Direction>,
    /// Flip between autonomous and directed control.
    pub toggle_mode: bool,
    /// Stop the session before the tick runs.
    pub quit: bool,
    /// Request the area-clear extension.
    pub detonate: bool,
}

impl TickInput {
    /// Folds a later frame's input into this one so nothing is lost between
    /// ticks. The latest direction wins and two toggles cancel out.
    #[must_use]
    pub fn merge(self, later: Self) -> Self {
        Self {
            direction: later.direction.or(self.direction),
            toggle_mode: self.toggle_mode ^ later.toggle_mode,
            quit: self.quit || later.quit,
            detonate: self.detonate || later.detonate,
        }
    }
}

/// Answer to the pause that follows a lost life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContinueDecision {
    /// Finish the interrupted tick and keep playing.
    Continue,
    /// End the session.
    Quit,
}

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Ticks are being processed.
    Running,
    /// A life was lost; waiting for a [`ContinueDecision`].
    AwaitingDecision,
    /// The last life was lost.
    GameOver,
    /// The player asked to stop.
    Quit,
}

impl SessionPhase {
    /// Whether no further ticks will run.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::GameOver | Self::Quit)
    }
}

/// Collaborator that drives a blocking [`Session::run`].
pub trait Host {
    /// Input for the upcoming tick.
    fn poll_input(&mut self) -> TickInput;

    /// Asks whether to keep playing after a life was lost.
    fn decide_after_life_lost(&mut self, lives: u32) -> ContinueDecision;

    /// Receives the state after a tick together with the events it produced.
    fn present(&mut self, snapshot: &GameSnapshot, events: &[Event]) -> Result<()>;

    /// Waits before the next tick.
    fn sleep(&mut self, duration: Duration);
}

/// Owns the world for the duration of a game and sequences every tick.
#[derive(Debug)]
pub struct Session {
    world: World,
    autopilot: Autopilot,
    phase: SessionPhase,
    pacer: Pacer,
    pending_input: TickInput,
    commands: Vec<Command>,
    events: Vec<Event>,
    ticks: u64,
}

impl Session {
    /// Creates a running session over the provided world.
    #[must_use]
    pub fn new(world: World, autopilot: Autopilot) -> Self {
        Self {
            world,
            autopilot,
            phase: SessionPhase::Running,
            pacer: Pacer::new(),
            pending_input: TickInput::default(),
            commands: Vec::new(),
            events: Vec::new(),
            ticks: 0,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Read access to the world for queries.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Number of ticks that ran to completion.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Movement interval for the current level.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        query::tick_interval(&self.world)
    }

    /// State handed to the rendering layer.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        query::snapshot(&self.world)
    }

    /// Final leaderboard record once the game is over.
    #[must_use]
    pub fn final_record(&self) -> Option<LeaderboardRecord> {
        query::final_record(&self.world)
    }

    /// Takes every world event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Runs one tick. Does nothing unless the session is running.
    pub fn step(&mut self, input: TickInput) -> SessionPhase {
        if self.phase != SessionPhase::Running {
            return self.phase;
        }

        if input.quit {
            info!(ticks = self.ticks, "quit requested");
            self.phase = SessionPhase::Quit;
            return self.phase;
        }

        if input.toggle_mode {
            let mode = query::play_mode(&self.world).toggled();
            self.commands.push(Command::SetPlayMode { mode });
        }
        if input.detonate {
            self.commands.push(Command::DetonateBomb);
        }
        self.flush_commands();

        self.resolve_heading(input.direction);

        self.submit(Command::AdvanceAgent);

        let mark = self.events.len();
        self.submit(Command::ResolveCollision);
        if query::is_game_over(&self.world) {
            self.phase = SessionPhase::GameOver;
            return self.phase;
        }
        if self.events[mark..]
            .iter()
            .any(|event| matches!(event, Event::LifeLost { .. }))
        {
            debug!(ticks = self.ticks, "awaiting decision after life lost");
            self.phase = SessionPhase::AwaitingDecision;
            self.pacer.reset();
            return self.phase;
        }

        self.finish_tick()
    }

    /// Answers the pause that follows a lost life.
    ///
    /// Continuing completes the interrupted tick against the respawned agent;
    /// quitting ends the session without a rescue check.
    pub fn resume(&mut self, decision: ContinueDecision) -> SessionPhase {
        if self.phase != SessionPhase::AwaitingDecision {
            return self.phase;
        }

        match decision {
            ContinueDecision::Continue => {
                self.phase = SessionPhase::Running;
                self.finish_tick()
            }
            ContinueDecision::Quit => {
                info!(ticks = self.ticks, "player quit after losing a life");
                self.phase = SessionPhase::Quit;
                self.phase
            }
        }
    }

    /// Feeds elapsed frame time and runs every tick that became due.
    ///
    /// Input from frames that fire no tick is held for the next one.
    pub fn advance(&mut self, dt: Duration, input: TickInput) -> SessionPhase {
        if self.phase != SessionPhase::Running {
            return self.phase;
        }

        self.pending_input = self.pending_input.merge(input);
        self.pacer.accumulate(dt);
        // Each tick is paid at the interval of the level it runs in.
        while self.pacer.consume(self.tick_interval()) {
            let input = std::mem::take(&mut self.pending_input);
            if self.step(input) != SessionPhase::Running {
                break;
            }
        }
        self.phase
    }

    /// Drives the session until it finishes, sleeping out the remainder of
    /// each tick interval.
    pub fn run<H>(&mut self, host: &mut H) -> Result<SessionPhase>
    where
        H: Host,
    {
        self.present(host)?;

        loop {
            let started = Instant::now();
            let input = host.poll_input();
            let mut phase = self.step(input);

            if phase == SessionPhase::AwaitingDecision {
                self.present(host)?;
                let lives = query::progress(&self.world).lives;
                phase = self.resume(host.decide_after_life_lost(lives));
            }

            self.present(host)?;
            if phase.is_finished() {
                return Ok(phase);
            }

            host.sleep(self.tick_interval().saturating_sub(started.elapsed()));
        }
    }

    fn resolve_heading(&mut self, requested: Option<Direction>) {
        match query::play_mode(&self.world) {
            PlayMode::Autonomous => {
                let view = query::occupancy_view(&self.world);
                self.autopilot.handle(
                    PlayMode::Autonomous,
                    query::agent_head(&self.world),
                    query::agent_heading(&self.world),
                    query::target(&self.world),
                    &view,
                    &mut self.commands,
                );
            }
            PlayMode::Directed => {
                if let Some(direction) = requested {
                    self.commands.push(Command::SetHeading { direction });
                }
            }
        }
        self.flush_commands();
    }

    fn finish_tick(&mut self) -> SessionPhase {
        self.submit(Command::ResolveRescue);
        self.ticks += 1;
        self.phase
    }

    fn submit(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn present<H>(&mut self, host: &mut H) -> Result<()>
    where
        H: Host,
    {
        let events = self.drain_events();
        host.present(&self.snapshot(), &events)
    }
}
