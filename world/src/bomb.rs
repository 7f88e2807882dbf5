//! Area-clear extension: trades levels for a hazard-free neighbourhood.

use robot_rescue_core::{BombRejection, CellCoord, Progress};

/// The player's level must exceed this before a bomb may be used.
pub const BOMB_MIN_LEVEL: u32 = 10;
/// Chebyshev radius around the head cleared by a bomb.
pub const BOMB_RADIUS: u32 = 5;
/// Levels consumed per bomb.
pub const BOMB_LEVEL_COST: u32 = 5;

/// Removes every hazard within [`BOMB_RADIUS`] of `center` and charges
/// [`BOMB_LEVEL_COST`] levels, never dropping below level one.
///
/// The cost is paid even when nothing is in range. Returns the removed cells.
pub fn detonate(
    progress: &mut Progress,
    center: CellCoord,
    hazards: &mut Vec<CellCoord>,
) -> Result<Vec<CellCoord>, BombRejection> {
    if progress.level <= BOMB_MIN_LEVEL {
        return Err(BombRejection::LevelTooLow);
    }

    let in_range = |cell: &CellCoord| {
        cell.column().abs_diff(center.column()) <= BOMB_RADIUS
            && cell.row().abs_diff(center.row()) <= BOMB_RADIUS
    };
    let cleared: Vec<CellCoord> = hazards.iter().copied().filter(in_range).collect();
    hazards.retain(|cell| !in_range(cell));

    progress.level = progress.level.saturating_sub(BOMB_LEVEL_COST).max(1);
    Ok(cleared)
}
