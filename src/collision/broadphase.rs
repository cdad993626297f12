//! Uniform-grid broad phase.
//!
//! The grid is rebuilt from scratch every step. A body is inserted into every
//! cell its AABB overlaps, so a pair sharing several cells would surface more
//! than once; `candidate_pairs` dedups through the ordered-pair set.

use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::utils::math::Bounds;
use crate::utils::BodyId;

pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<BodyId>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, id: BodyId, bounds: &Bounds) {
        let (min_x, min_y) = self.cell_coord(bounds.mins);
        let (max_x, max_y) = self.cell_coord(bounds.maxs);
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                self.cells.entry((x, y)).or_default().push(id);
            }
        }
    }

    /// All unordered body pairs sharing at least one cell.
    pub fn candidate_pairs(&self) -> HashSet<(BodyId, BodyId)> {
        let mut pairs = HashSet::new();
        for list in self.cells.values() {
            for i in 0..list.len() {
                for j in (i + 1)..list.len() {
                    let a = list[i].min(list[j]);
                    let b = list[i].max(list[j]);
                    pairs.insert((a, b));
                }
            }
        }
        pairs
    }

    #[cfg(test)]
    pub(crate) fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::allocator::Slot;

    fn id(index: u32) -> BodyId {
        BodyId(Slot::new(index, 0))
    }

    #[test]
    fn straddling_bounds_occupy_multiple_cells() {
        let mut hash = SpatialHash::new(2.0);
        hash.insert(
            id(0),
            &Bounds::new(Vec2::new(-0.5, -0.5), Vec2::new(0.5, 0.5)),
        );
        assert_eq!(hash.occupied_cells(), 4);
    }

    #[test]
    fn pairs_are_deduplicated_across_cells() {
        let mut hash = SpatialHash::new(2.0);
        // Both AABBs span the same four cells.
        let bounds = Bounds::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        hash.insert(id(0), &bounds);
        hash.insert(id(1), &bounds);
        hash.insert(id(2), &Bounds::new(Vec2::new(50.0, 50.0), Vec2::new(51.0, 51.0)));

        let pairs = hash.candidate_pairs();
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains(&(id(0), id(1))));
    }
}
