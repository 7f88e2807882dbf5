use std::time::Duration;

use anyhow::Result;
use robot_rescue_core::{
    CellCoord, Direction, Event, GameRules, GameSnapshot, LethalContact, PlayMode, PlayerName,
    Progress, RESCUE_REWARD, SPAWN_ANCHOR,
};
use robot_rescue_system_autopilot::{Autopilot, Config};
use robot_rescue_system_session::{ContinueDecision, Host, Session, SessionPhase, TickInput};
use robot_rescue_world::{query, Layout, World};

fn progress(lives: u32) -> Progress {
    Progress {
        name: PlayerName::new("tester").expect("valid name"),
        score: 0,
        lives,
        level: 1,
        rescued: 0,
    }
}

fn session_with(
    head: CellCoord,
    hazards: Vec<CellCoord>,
    target: CellCoord,
    lives: u32,
) -> Session {
    let world = World::with_layout(
        Layout {
            head,
            heading: Direction::East,
            hazards,
            target,
            progress: progress(lives),
        },
        GameRules::default(),
    );
    Session::new(world, Autopilot::new(Config::new(0)))
}

fn directed(direction: Direction) -> TickInput {
    TickInput {
        direction: Some(direction),
        ..TickInput::default()
    }
}

fn take_control() -> TickInput {
    TickInput {
        toggle_mode: true,
        ..TickInput::default()
    }
}

#[test]
fn autonomous_tick_moves_toward_target_and_rescues() {
    let mut session = session_with(CellCoord::new(10, 10), Vec::new(), CellCoord::new(10, 8), 3);

    assert_eq!(session.step(TickInput::default()), SessionPhase::Running);
    assert_eq!(query::agent_head(session.world()), CellCoord::new(10, 9));
    assert_eq!(session.step(TickInput::default()), SessionPhase::Running);

    assert_eq!(query::progress(session.world()).score, RESCUE_REWARD);
    assert_eq!(session.ticks(), 2);
    assert!(session
        .drain_events()
        .iter()
        .any(|event| matches!(event, Event::PersonRescued { .. })));
    assert!(session.drain_events().is_empty(), "events are drained once");
}

#[test]
fn directed_mode_ignores_autopilot_and_follows_input() {
    let mut session = session_with(CellCoord::new(10, 10), Vec::new(), CellCoord::new(10, 5), 3);

    let _ = session.step(take_control());
    assert_eq!(query::play_mode(session.world()), PlayMode::Directed);
    // Without input the agent keeps its east heading.
    assert_eq!(query::agent_head(session.world()), CellCoord::new(11, 10));

    let _ = session.step(directed(Direction::South));
    assert_eq!(query::agent_head(session.world()), CellCoord::new(11, 11));
    let _ = session.step(TickInput::default());
    assert_eq!(query::agent_head(session.world()), CellCoord::new(11, 12));
}

#[test]
fn autonomous_mode_ignores_directional_input() {
    let mut session = session_with(CellCoord::new(10, 10), Vec::new(), CellCoord::new(14, 10), 3);

    let _ = session.step(directed(Direction::North));

    assert_eq!(query::agent_head(session.world()), CellCoord::new(11, 10));
}

#[test]
fn quit_stops_before_the_tick_runs() {
    let mut session = session_with(CellCoord::new(10, 10), Vec::new(), CellCoord::new(14, 10), 3);

    let phase = session.step(TickInput {
        quit: true,
        ..TickInput::default()
    });

    assert_eq!(phase, SessionPhase::Quit);
    assert_eq!(query::agent_head(session.world()), CellCoord::new(10, 10));
    assert_eq!(session.step(TickInput::default()), SessionPhase::Quit);
    assert_eq!(session.ticks(), 0);
}

#[test]
fn losing_a_life_pauses_until_decision() {
    let hazards = vec![CellCoord::new(6, 6)];
    let mut session = session_with(CellCoord::new(5, 6), hazards, CellCoord::new(40, 15), 3);
    let _ = session.step(take_control());
    // The toggle tick already moved the agent onto the hazard.
    assert_eq!(session.phase(), SessionPhase::AwaitingDecision);
    assert_eq!(query::progress(session.world()).lives, 2);
    assert_eq!(query::agent_head(session.world()), SPAWN_ANCHOR);

    let head = query::agent_head(session.world());
    assert_eq!(
        session.step(directed(Direction::North)),
        SessionPhase::AwaitingDecision
    );
    assert_eq!(
        query::agent_head(session.world()),
        head,
        "paused session does not move"
    );
    assert_eq!(session.ticks(), 0);

    assert_eq!(session.resume(ContinueDecision::Continue), SessionPhase::Running);
    assert_eq!(session.ticks(), 1);
    assert_eq!(session.step(TickInput::default()), SessionPhase::Running);
}

#[test]
fn continuing_checks_rescue_at_the_respawn_cell() {
    let hazards = vec![CellCoord::new(6, 6)];
    let mut session = session_with(CellCoord::new(5, 6), hazards, SPAWN_ANCHOR, 3);

    assert_eq!(session.step(take_control()), SessionPhase::AwaitingDecision);
    assert_eq!(query::progress(session.world()).score, 0);

    let _ = session.resume(ContinueDecision::Continue);

    assert_eq!(query::progress(session.world()).score, RESCUE_REWARD);
    assert_ne!(query::target(session.world()), SPAWN_ANCHOR);
}

#[test]
fn quitting_after_life_lost_skips_rescue() {
    let hazards = vec![CellCoord::new(6, 6)];
    let mut session = session_with(CellCoord::new(5, 6), hazards, SPAWN_ANCHOR, 3);
    let _ = session.step(take_control());

    assert_eq!(session.resume(ContinueDecision::Quit), SessionPhase::Quit);
    assert_eq!(query::progress(session.world()).score, 0);
    assert_eq!(session.resume(ContinueDecision::Continue), SessionPhase::Quit);
}

#[test]
fn wall_on_last_life_ends_the_session() {
    let mut session = session_with(CellCoord::new(48, 3), Vec::new(), CellCoord::new(5, 15), 1);
    let _ = session.step(take_control());

    assert_eq!(session.phase(), SessionPhase::GameOver);
    let record = session.final_record().expect("final record");
    assert_eq!(record.score, 0);
    assert_eq!(record.level, 1);
    assert!(session.drain_events().iter().any(|event| matches!(
        event,
        Event::GameOver {
            contact: LethalContact::Wall,
            ..
        }
    )));
    assert_eq!(session.step(TickInput::default()), SessionPhase::GameOver);
}

#[test]
fn frame_time_accumulates_into_ticks() {
    let mut session = session_with(CellCoord::new(10, 10), Vec::new(), CellCoord::new(30, 3), 3);
    let interval = session.tick_interval();
    assert_eq!(interval, Duration::from_millis(400));

    for _ in 0..3 {
        let _ = session.advance(Duration::from_millis(100), TickInput::default());
    }
    assert_eq!(session.ticks(), 0);

    let _ = session.advance(Duration::from_millis(100), take_control());
    assert_eq!(session.ticks(), 1);
    assert_eq!(query::play_mode(session.world()), PlayMode::Directed);

    let _ = session.advance(Duration::from_millis(800), TickInput::default());
    assert_eq!(session.ticks(), 3);
}

#[test]
fn level_up_mid_frame_speeds_up_remaining_ticks() {
    let world = World::with_layout(
        Layout {
            head: CellCoord::new(10, 10),
            heading: Direction::East,
            hazards: Vec::new(),
            target: CellCoord::new(11, 10),
            progress: Progress {
                rescued: 4,
                ..progress(3)
            },
        },
        GameRules::default(),
    );
    let mut session = Session::new(world, Autopilot::new(Config::new(0)));
    assert_eq!(session.tick_interval(), Duration::from_millis(400));

    // The first tick rescues at level one; the remaining 400 ms run at level two.
    let _ = session.advance(Duration::from_millis(800), TickInput::default());

    assert_eq!(query::progress(session.world()).level, 2);
    assert_eq!(session.tick_interval(), Duration::from_millis(200));
    assert_eq!(session.ticks(), 3);
}

#[test]
fn input_between_ticks_is_held_for_the_next_tick() {
    let mut session = session_with(CellCoord::new(10, 10), Vec::new(), CellCoord::new(30, 3), 3);
    let _ = session.advance(Duration::from_millis(100), take_control());
    let _ = session.advance(Duration::from_millis(100), directed(Direction::South));
    assert_eq!(session.ticks(), 0);

    let _ = session.advance(Duration::from_millis(200), TickInput::default());

    assert_eq!(session.ticks(), 1);
    assert_eq!(query::play_mode(session.world()), PlayMode::Directed);
    assert_eq!(query::agent_head(session.world()), CellCoord::new(10, 11));
}

#[derive(Default)]
struct ScriptedHost {
    inputs: Vec<TickInput>,
    decisions: Vec<ContinueDecision>,
    presented: Vec<GameSnapshot>,
    events: Vec<Event>,
    slept: Vec<Duration>,
}

impl Host for ScriptedHost {
    fn poll_input(&mut self) -> TickInput {
        if self.inputs.is_empty() {
            TickInput {
                quit: true,
                ..TickInput::default()
            }
        } else {
            self.inputs.remove(0)
        }
    }

    fn decide_after_life_lost(&mut self, _lives: u32) -> ContinueDecision {
        if self.decisions.is_empty() {
            ContinueDecision::Quit
        } else {
            self.decisions.remove(0)
        }
    }

    fn present(&mut self, snapshot: &GameSnapshot, events: &[Event]) -> Result<()> {
        self.presented.push(snapshot.clone());
        self.events.extend_from_slice(events);
        Ok(())
    }

    fn sleep(&mut self, duration: Duration) {
        self.slept.push(duration);
    }
}

#[test]
fn run_presents_every_tick_and_stops_on_quit() {
    let mut session = session_with(CellCoord::new(10, 10), Vec::new(), CellCoord::new(30, 3), 3);
    let mut host = ScriptedHost {
        inputs: vec![TickInput::default(); 3],
        ..ScriptedHost::default()
    };

    let phase = session.run(&mut host).expect("run succeeds");

    assert_eq!(phase, SessionPhase::Quit);
    assert_eq!(session.ticks(), 3);
    // Initial frame, three ticks and the final frame.
    assert_eq!(host.presented.len(), 5);
    assert_eq!(host.slept.len(), 3);
    assert!(host
        .slept
        .iter()
        .all(|duration| *duration <= Duration::from_millis(400)));
    assert_eq!(
        host.events
            .iter()
            .filter(|event| matches!(event, Event::AgentAdvanced { .. }))
            .count(),
        3
    );
}

#[test]
fn run_asks_host_after_life_lost() {
    let hazards = vec![CellCoord::new(6, 6)];
    let mut session = session_with(CellCoord::new(5, 6), hazards, CellCoord::new(40, 15), 3);
    let mut host = ScriptedHost {
        inputs: vec![take_control(), TickInput::default()],
        decisions: vec![ContinueDecision::Continue],
        ..ScriptedHost::default()
    };

    let phase = session.run(&mut host).expect("run succeeds");

    assert_eq!(phase, SessionPhase::Quit);
    assert_eq!(session.ticks(), 2);
    assert_eq!(query::progress(session.world()).lives, 2);
    let paused = &host.presented[1];
    assert!(paused.agent.invincible);
    assert_eq!(paused.agent.head, SPAWN_ANCHOR);
}
