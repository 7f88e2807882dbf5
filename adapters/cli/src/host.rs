//! Headless host that lets the autopilot play and streams snapshots.

use std::{io::Write, thread, time::Duration};

use anyhow::{Context, Result};
use robot_rescue_core::{Event, GameSnapshot};
use robot_rescue_system_session::{ContinueDecision, Host, TickInput};
use tracing::{debug, info};

use crate::settings::LifeLostPolicy;

/// Behaviour switches for [`HeadlessHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HostConfig {
    pub(crate) max_ticks: u64,
    pub(crate) realtime: bool,
    pub(crate) on_life_lost: LifeLostPolicy,
}

/// Host with no input device: never steers, stops after a tick budget and
/// optionally writes one JSON snapshot per line.
#[derive(Debug)]
pub(crate) struct HeadlessHost<W> {
    config: HostConfig,
    polled: u64,
    presented: u64,
    sink: Option<W>,
}

impl<W> HeadlessHost<W>
where
    W: Write,
{
    pub(crate) fn new(config: HostConfig, sink: Option<W>) -> Self {
        Self {
            config,
            polled: 0,
            presented: 0,
            sink,
        }
    }

    /// Number of frames handed to [`Host::present`].
    pub(crate) const fn presented(&self) -> u64 {
        self.presented
    }

    #[cfg(test)]
    fn into_sink(self) -> Option<W> {
        self.sink
    }
}

impl<W> Host for HeadlessHost<W>
where
    W: Write,
{
    fn poll_input(&mut self) -> TickInput {
        self.polled += 1;
        TickInput {
            quit: self.polled > self.config.max_ticks,
            ..TickInput::default()
        }
    }

    fn decide_after_life_lost(&mut self, lives: u32) -> ContinueDecision {
        let decision = match self.config.on_life_lost {
            LifeLostPolicy::Continue => ContinueDecision::Continue,
            LifeLostPolicy::Quit => ContinueDecision::Quit,
        };
        info!(lives, ?decision, "life lost");
        decision
    }

    fn present(&mut self, snapshot: &GameSnapshot, events: &[Event]) -> Result<()> {
        self.presented += 1;
        for event in events {
            debug!(?event, "world event");
        }

        if let Some(sink) = self.sink.as_mut() {
            serde_json::to_writer(&mut *sink, snapshot).context("failed to encode snapshot")?;
            writeln!(sink).context("failed to write snapshot")?;
        }
        Ok(())
    }

    fn sleep(&mut self, duration: Duration) {
        if self.config.realtime && !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_rescue_core::{GameRules, PlayerName};
    use robot_rescue_system_autopilot::{Autopilot, Config};
    use robot_rescue_system_session::{Session, SessionPhase};
    use robot_rescue_world::World;

    fn config(max_ticks: u64, on_life_lost: LifeLostPolicy) -> HostConfig {
        HostConfig {
            max_ticks,
            realtime: false,
            on_life_lost,
        }
    }

    fn session() -> Session {
        let world = World::new(
            PlayerName::new("host").expect("valid name"),
            GameRules::default(),
        );
        Session::new(world, Autopilot::new(Config::new(0)))
    }

    #[test]
    fn quits_after_tick_budget() {
        let mut host = HeadlessHost::<Vec<u8>>::new(config(2, LifeLostPolicy::Continue), None);

        assert!(!host.poll_input().quit);
        assert!(!host.poll_input().quit);
        assert!(host.poll_input().quit);
    }

    #[test]
    fn follows_life_lost_policy() {
        let mut keep = HeadlessHost::<Vec<u8>>::new(config(1, LifeLostPolicy::Continue), None);
        let mut stop = HeadlessHost::<Vec<u8>>::new(config(1, LifeLostPolicy::Quit), None);

        assert_eq!(keep.decide_after_life_lost(2), ContinueDecision::Continue);
        assert_eq!(stop.decide_after_life_lost(2), ContinueDecision::Quit);
    }

    #[test]
    fn streams_one_json_line_per_frame() {
        let mut session = session();
        let mut host = HeadlessHost::new(config(4, LifeLostPolicy::Continue), Some(Vec::new()));

        let phase = session.run(&mut host).expect("run succeeds");

        assert_eq!(phase, SessionPhase::Quit);
        let frames = host.presented();
        let output = host.into_sink().expect("sink");
        let text = String::from_utf8(output).expect("utf-8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len() as u64, frames);
        for line in lines {
            let snapshot: GameSnapshot = serde_json::from_str(line).expect("snapshot json");
            assert_eq!(snapshot.columns, 50);
            assert_eq!(snapshot.rows, 20);
        }
    }
}
