//! Grid topology: neighbour lookup and expansion.

use rand::Rng;

use delooped_core::components::Loop;
use delooped_core::enums::Direction;
use delooped_core::types::LoopPos;

use crate::run_state::Loops;

/// Vacant orthogonal neighbours of `pos`, in +x, -x, +y, -y order.
pub fn vacant_neighbors(loops: &Loops, pos: LoopPos) -> Vec<LoopPos> {
    [Direction::Right, Direction::Left, Direction::Bottom, Direction::Top]
        .into_iter()
        .map(|d| pos.neighbor(d))
        .filter(|p| !loops.contains_key(p))
        .collect()
}

/// Pick a cell to grow the grid into.
///
/// Picks a random existing loop, then a random vacant neighbour of it. A
/// loop with no vacant neighbour is discarded and another one is tried.
/// Returns `None` only when every loop is boxed in.
pub fn find_expansion_cell<R: Rng>(loops: &Loops, rng: &mut R) -> Option<LoopPos> {
    let mut candidates: Vec<LoopPos> = loops.keys().copied().collect();
    while !candidates.is_empty() {
        let index = rng.gen_range(0..candidates.len());
        let vacant = vacant_neighbors(loops, candidates[index]);
        if !vacant.is_empty() {
            return Some(vacant[rng.gen_range(0..vacant.len())]);
        }
        candidates.remove(index);
    }
    None
}

/// Add an empty loop at an expansion cell. Returns where it was placed.
pub fn expand<R: Rng>(loops: &mut Loops, rng: &mut R) -> Option<LoopPos> {
    let pos = find_expansion_cell(loops, rng)?;
    loops.insert(pos, Loop::default());
    log::debug!("grid expanded to {pos}");
    Some(pos)
}
