//! Score, level and life progression.

use rand::Rng;
use robot_rescue_core::{
    CellCoord, CrossObstacle, Progress, LIFE_BONUS_LEVEL_STRIDE, MAX_BODY_SEGMENTS, MAX_MINES,
    MINES_PER_LEVEL, PEOPLE_PER_LEVEL, RESCUE_REWARD,
};

pub use robot_rescue_core::tick_interval_for;

use crate::{agent::Agent, placement};

/// Changes applied by a single rescue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RescueOutcome {
    /// Level reached, when the rescue completed a level.
    pub level_advanced: Option<u32>,
    /// Hazards added because the level advanced.
    pub placed_hazards: Vec<CellCoord>,
    /// Lives after a milestone bonus, when one was granted.
    pub life_granted: Option<u32>,
}

/// Applies the reward for a rescue and any level-up consequences.
///
/// Every [`PEOPLE_PER_LEVEL`] rescues the level advances, the rescue counter
/// resets and [`MINES_PER_LEVEL`] hazards are added. Levels divisible by
/// [`LIFE_BONUS_LEVEL_STRIDE`] also grant a life, capped at the body segment
/// limit, and rebuild the body to match.
pub fn on_rescue<R>(
    rng: &mut R,
    progress: &mut Progress,
    agent: &mut Agent,
    hazards: &mut Vec<CellCoord>,
    target: CellCoord,
    obstacle: &CrossObstacle,
) -> RescueOutcome
where
    R: Rng + ?Sized,
{
    progress.score = progress.score.saturating_add(RESCUE_REWARD);
    progress.rescued += 1;

    let mut outcome = RescueOutcome::default();
    if progress.rescued < PEOPLE_PER_LEVEL {
        return outcome;
    }

    progress.level = progress.level.saturating_add(1);
    progress.rescued = 0;
    outcome.level_advanced = Some(progress.level);

    let hazard_target = (hazards.len() + MINES_PER_LEVEL).min(MAX_MINES);
    outcome.placed_hazards = placement::place_hazards(
        rng,
        hazards,
        hazard_target,
        agent.head(),
        target,
        obstacle,
    );

    if progress.level % LIFE_BONUS_LEVEL_STRIDE == 0 {
        let cap = u32::try_from(MAX_BODY_SEGMENTS).unwrap_or(u32::MAX);
        progress.lives = (progress.lives + 1).min(cap);
        agent.resize_body_from_lives(progress.lives);
        outcome.life_granted = Some(progress.lives);
    }

    outcome
}
