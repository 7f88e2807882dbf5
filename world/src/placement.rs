//! Constraint-respecting placement of hazards, the rescue target and the
//! agent's spawn point.

use rand::Rng;
use robot_rescue_core::{
    is_obstacle, CellCoord, CrossObstacle, BOARD_COLUMNS, BOARD_ROWS, MAX_MINES,
};
use tracing::warn;

/// Random draws attempted before placement falls back to a row-major scan.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Appends uniformly sampled hazards until `hazards` holds `target_count`
/// cells, clamped to [`MAX_MINES`], and returns the cells that were added.
///
/// New hazards never coincide with the agent, the target, the obstacle, or an
/// existing hazard.
///
/// # Panics
///
/// Panics if the board does not have enough free cells for the requested
/// count. Hazard density is a configuration invariant, not a runtime error.
pub fn place_hazards<R>(
    rng: &mut R,
    hazards: &mut Vec<CellCoord>,
    target_count: usize,
    agent: CellCoord,
    target: CellCoord,
    obstacle: &CrossObstacle,
) -> Vec<CellCoord>
where
    R: Rng + ?Sized,
{
    let target_count = target_count.min(MAX_MINES);
    let needed = target_count.saturating_sub(hazards.len());
    if needed == 0 {
        return Vec::new();
    }

    let free = interior_cells()
        .filter(|cell| *cell != agent && *cell != target)
        .filter(|cell| !is_obstacle(obstacle, *cell) && !hazards.contains(cell))
        .count();
    assert!(
        needed < free,
        "hazard placement needs {needed} cells but only {free} are free"
    );

    let mut placed = Vec::with_capacity(needed);
    while hazards.len() < target_count {
        let cell = sample_free_cell(rng, |cell| {
            cell == agent
                || cell == target
                || is_obstacle(obstacle, cell)
                || hazards.contains(&cell)
        });
        let Some(cell) = cell else {
            break;
        };
        hazards.push(cell);
        placed.push(cell);
    }
    placed
}

/// Samples a fresh rescue target away from the agent, hazards and obstacle.
///
/// # Panics
///
/// Panics if every interior cell is excluded.
pub fn place_target<R>(
    rng: &mut R,
    agent: CellCoord,
    hazards: &[CellCoord],
    obstacle: &CrossObstacle,
) -> CellCoord
where
    R: Rng + ?Sized,
{
    let excluded =
        |cell: CellCoord| cell == agent || is_obstacle(obstacle, cell) || hazards.contains(&cell);
    let Some(cell) = sample_free_cell(rng, excluded) else {
        panic!("no free interior cell left for the target");
    };
    cell
}

/// Finds the free interior cell closest to `anchor` by Manhattan distance.
///
/// The scan is deterministic and row-major; on ties the first cell found wins.
/// Falls back to `anchor` itself when no free cell exists.
#[must_use]
pub fn find_safe_spawn(
    hazards: &[CellCoord],
    obstacle: &CrossObstacle,
    anchor: CellCoord,
) -> CellCoord {
    let mut best: Option<(u32, CellCoord)> = None;
    for cell in interior_cells() {
        if is_obstacle(obstacle, cell) || hazards.contains(&cell) {
            continue;
        }
        let distance = cell.manhattan_distance(anchor);
        if best.map_or(true, |(best_distance, _)| distance < best_distance) {
            best = Some((distance, cell));
        }
    }

    match best {
        Some((_, cell)) => cell,
        None => {
            warn!(%anchor, "no free cell for respawn, using anchor");
            anchor
        }
    }
}

/// Interior cells in row-major order.
pub(crate) fn interior_cells() -> impl Iterator<Item = CellCoord> {
    (1..BOARD_ROWS - 1)
        .flat_map(|row| (1..BOARD_COLUMNS - 1).map(move |column| CellCoord::new(column, row)))
}

fn sample_free_cell<R, F>(rng: &mut R, is_excluded: F) -> Option<CellCoord>
where
    R: Rng + ?Sized,
    F: Fn(CellCoord) -> bool,
{
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let cell = CellCoord::new(
            rng.gen_range(1..BOARD_COLUMNS - 1),
            rng.gen_range(1..BOARD_ROWS - 1),
        );
        if !is_excluded(cell) {
            return Some(cell);
        }
    }

    warn!(
        attempts = MAX_PLACEMENT_ATTEMPTS,
        "random placement exhausted, scanning for a free cell"
    );
    interior_cells().find(|cell| !is_excluded(*cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use robot_rescue_core::{is_interior, SPAWN_ANCHOR};

    #[test]
    fn safe_spawn_prefers_anchor_when_free() {
        let obstacle = CrossObstacle::centered();
        assert_eq!(find_safe_spawn(&[], &obstacle, SPAWN_ANCHOR), SPAWN_ANCHOR);
    }

    #[test]
    fn safe_spawn_breaks_ties_in_scan_order() {
        let obstacle = CrossObstacle::centered();
        let hazards = [SPAWN_ANCHOR];
        // (10, 9) is scanned before (9, 10), (11, 10) and (10, 11).
        assert_eq!(
            find_safe_spawn(&hazards, &obstacle, SPAWN_ANCHOR),
            CellCoord::new(10, 9)
        );
    }

    #[test]
    fn safe_spawn_skips_obstacle() {
        let obstacle = CrossObstacle::centered();
        let spawn = find_safe_spawn(&[], &obstacle, obstacle.center());
        assert!(!obstacle.contains(spawn));
        assert_eq!(spawn.manhattan_distance(obstacle.center()), 2);
    }

    #[test]
    fn target_avoids_agent_hazards_and_obstacle() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let obstacle = CrossObstacle::centered();
        let hazards = vec![CellCoord::new(5, 5), CellCoord::new(6, 6)];
        let agent = CellCoord::new(10, 10);

        for _ in 0..500 {
            let target = place_target(&mut rng, agent, &hazards, &obstacle);
            assert!(is_interior(target));
            assert_ne!(target, agent);
            assert!(!hazards.contains(&target));
            assert!(!obstacle.contains(target));
        }
    }

    #[test]
    fn hazards_clamp_to_maximum() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let obstacle = CrossObstacle::centered();
        let mut hazards = Vec::new();

        let placed = place_hazards(
            &mut rng,
            &mut hazards,
            MAX_MINES + 25,
            CellCoord::new(10, 10),
            CellCoord::new(40, 15),
            &obstacle,
        );

        assert_eq!(placed.len(), MAX_MINES);
        assert_eq!(hazards.len(), MAX_MINES);
        let again = place_hazards(
            &mut rng,
            &mut hazards,
            MAX_MINES,
            CellCoord::new(10, 10),
            CellCoord::new(40, 15),
            &obstacle,
        );
        assert!(again.is_empty());
    }

    proptest! {
        #[test]
        fn placed_hazards_respect_exclusions(seed in any::<u64>(), count in 0usize..=MAX_MINES) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let obstacle = CrossObstacle::centered();
            let agent = CellCoord::new(10, 10);
            let target = CellCoord::new(12, 4);
            let mut hazards = vec![CellCoord::new(3, 3)];

            let _ = place_hazards(&mut rng, &mut hazards, count, agent, target, &obstacle);

            prop_assert!(hazards.len() <= MAX_MINES);
            prop_assert_eq!(hazards.len(), count.max(1));
            let mut unique = hazards.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), hazards.len());
            for hazard in &hazards {
                prop_assert!(is_interior(*hazard));
                prop_assert!(*hazard != agent && *hazard != target);
                prop_assert!(!obstacle.contains(*hazard));
            }
        }
    }
}
