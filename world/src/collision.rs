//! Lethal contact detection and the life/invincibility state machine.

use robot_rescue_core::{
    is_obstacle, is_wall, CellCoord, LethalContact, OccupancyView, Progress, INVINCIBLE_TICKS,
    SPAWN_ANCHOR,
};

use crate::{agent::Agent, placement};

/// Collision state carried by the agent between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Vitality {
    /// Lethal contact costs a life.
    #[default]
    Safe,
    /// Lethal contact is ignored for the remaining ticks.
    Invincible {
        /// Ticks left before returning to [`Vitality::Safe`]. Never zero.
        ticks_remaining: u32,
    },
}

impl Vitality {
    /// Whether lethal contact is currently ignored.
    #[must_use]
    pub const fn is_invincible(self) -> bool {
        matches!(self, Self::Invincible { .. })
    }

    /// Grace ticks left; zero when safe.
    #[must_use]
    pub const fn ticks_remaining(self) -> u32 {
        match self {
            Self::Safe => 0,
            Self::Invincible { ticks_remaining } => ticks_remaining,
        }
    }
}

/// Result of resolving one tick of collisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    /// A life was lost and the agent respawned.
    pub life_lost: bool,
    /// The last life was lost; the game is over.
    pub game_over: bool,
    /// What the head touched, when contact was lethal.
    pub contact: Option<LethalContact>,
    /// Where the agent reappeared after losing a life.
    pub respawn: Option<CellCoord>,
    /// The grace period ended this tick.
    pub invincibility_expired: bool,
}

/// Classifies the cell under the head. Walls win over hazards, hazards over
/// the obstacle.
#[must_use]
pub fn lethal_contact(cell: CellCoord, view: &OccupancyView<'_>) -> Option<LethalContact> {
    if is_wall(cell) {
        Some(LethalContact::Wall)
    } else if view.is_hazard_at(cell) {
        Some(LethalContact::Hazard)
    } else if is_obstacle(view.obstacle(), cell) {
        Some(LethalContact::Obstacle)
    } else {
        None
    }
}

/// Resolves collisions for the agent after it has moved.
///
/// A safe agent on a lethal cell loses a life. If lives remain it respawns
/// next to [`SPAWN_ANCHOR`] with a rebuilt body and becomes invincible for
/// [`INVINCIBLE_TICKS`]; otherwise the game is over and the agent stays put.
/// An invincible agent ignores contact and counts down one tick.
pub fn resolve(
    agent: &mut Agent,
    progress: &mut Progress,
    view: &OccupancyView<'_>,
) -> CollisionOutcome {
    if let Vitality::Invincible { ticks_remaining } = agent.vitality() {
        let remaining = ticks_remaining.saturating_sub(1);
        if remaining == 0 {
            agent.set_vitality(Vitality::Safe);
        } else {
            agent.set_vitality(Vitality::Invincible {
                ticks_remaining: remaining,
            });
        }
        return CollisionOutcome {
            invincibility_expired: remaining == 0,
            ..CollisionOutcome::default()
        };
    }

    let Some(contact) = lethal_contact(agent.head(), view) else {
        return CollisionOutcome::default();
    };

    progress.lives = progress.lives.saturating_sub(1);
    if progress.lives == 0 {
        agent.resize_body_from_lives(0);
        return CollisionOutcome {
            game_over: true,
            contact: Some(contact),
            ..CollisionOutcome::default()
        };
    }

    let respawn = placement::find_safe_spawn(view.hazards(), view.obstacle(), SPAWN_ANCHOR);
    agent.relocate(respawn);
    agent.resize_body_from_lives(progress.lives);
    agent.set_vitality(Vitality::Invincible {
        ticks_remaining: INVINCIBLE_TICKS,
    });

    CollisionOutcome {
        life_lost: true,
        contact: Some(contact),
        respawn: Some(respawn),
        ..CollisionOutcome::default()
    }
}
