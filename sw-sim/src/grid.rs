use std::collections::HashMap;

use rand::Rng;
use sw_storage::Orientation;

use crate::error::{WorldError, WorldResult};

/// What occupies a grid cell. Only `Bug` and `Egg` are movable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Bug(u64),
    Egg(u64),
    Food(u64),
}

impl Occupant {
    pub fn is_movable(self) -> bool {
        !matches!(self, Occupant::Food(_))
    }

    pub fn id(self) -> u64 {
        match self {
            Occupant::Bug(id) | Occupant::Egg(id) | Occupant::Food(id) => id,
        }
    }
}

/// A position on the grid. Coordinates are always in `0..size_x`/`0..size_y`.
pub type Position = (u32, u32);

/// A rectangular sub-range of the grid, used to scope spawner placement.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub start_x: u32,
    pub start_y: u32,
    pub end_x: u32,
    pub end_y: u32,
}

/// Fixed-size toroidal grid of world occupants.
#[derive(Debug, Clone)]
pub struct Grid {
    size_x: u32,
    size_y: u32,
    cells: HashMap<Position, Occupant>,
}

impl Grid {
    pub fn new(size_x: u32, size_y: u32) -> Self {
        Self { size_x, size_y, cells: HashMap::new() }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.size_x, self.size_y)
    }

    fn in_range(&self, position: Position) -> bool {
        position.0 < self.size_x && position.1 < self.size_y
    }

    pub fn get(&self, position: Position) -> Option<Occupant> {
        self.cells.get(&position).copied()
    }

    pub fn add(&mut self, occupant: Occupant, position: Position) -> WorldResult<()> {
        if !self.in_range(position) {
            return Err(WorldError::OutOfRange);
        }
        if self.cells.contains_key(&position) {
            return Err(WorldError::PositionUsed);
        }
        self.cells.insert(position, occupant);
        Ok(())
    }

    pub fn remove(&mut self, position: Position) -> Option<Occupant> {
        self.cells.remove(&position)
    }

    pub fn move_occupant(&mut self, from: Position, to: Position) -> WorldResult<()> {
        if !self.in_range(to) {
            return Err(WorldError::OutOfRange);
        }
        let occupant = self.get(from).ok_or(WorldError::PositionUsed)?;
        if !occupant.is_movable() {
            return Err(WorldError::NotMovable);
        }
        if self.cells.contains_key(&to) {
            return Err(WorldError::PositionUsed);
        }
        self.cells.remove(&from);
        self.cells.insert(to, occupant);
        Ok(())
    }

    /// Wrap `position` plus `(dx, dy)` onto the toroidal grid.
    pub fn wrap(&self, position: Position, delta: (i32, i32)) -> Position {
        let x = (position.0 as i64 + delta.0 as i64).rem_euclid(self.size_x as i64) as u32;
        let y = (position.1 as i64 + delta.1 as i64).rem_euclid(self.size_y as i64) as u32;
        (x, y)
    }

    /// The cell directly in front of a bug at `position` facing `orientation`.
    pub fn cell_in_front(&self, position: Position, orientation: Orientation) -> Position {
        self.wrap(position, orientation.delta())
    }

    /// The cell directly behind a bug at `position` facing `orientation`.
    pub fn cell_behind(&self, position: Position, orientation: Orientation) -> Position {
        self.wrap(position, orientation.opposite().delta())
    }

    /// A uniformly sampled unused position, optionally restricted to `region`.
    pub fn unused_position(&self, region: Option<Region>, rng: &mut impl Rng) -> WorldResult<Position> {
        let region = region.unwrap_or(Region { start_x: 0, start_y: 0, end_x: self.size_x, end_y: self.size_y });
        let free: Vec<Position> = (region.start_x..region.end_x.min(self.size_x))
            .flat_map(|x| (region.start_y..region.end_y.min(self.size_y)).map(move |y| (x, y)))
            .filter(|p| !self.cells.contains_key(p))
            .collect();
        if free.is_empty() {
            return Err(WorldError::WorldFull);
        }
        let index = rng.gen_range(0..free.len());
        Ok(free[index])
    }

    /// Count occupants within `region` matching `predicate`, used to cap
    /// spawner output at a configured population ceiling.
    pub fn count_in_region(&self, region: Region, predicate: impl Fn(Occupant) -> bool) -> usize {
        let end_x = region.end_x.min(self.size_x);
        let end_y = region.end_y.min(self.size_y);
        self.cells
            .iter()
            .filter(|(position, occupant)| {
                position.0 >= region.start_x
                    && position.0 < end_x
                    && position.1 >= region.start_y
                    && position.1 < end_y
                    && predicate(**occupant)
            })
            .count()
    }

    pub fn random_orientation(rng: &mut impl Rng) -> Orientation {
        match rng.gen_range(0..4) {
            0 => Orientation::North,
            1 => Orientation::East,
            2 => Orientation::South,
            _ => Orientation::West,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn add_rejects_occupied_and_out_of_range() {
        let mut grid = Grid::new(4, 4);
        grid.add(Occupant::Bug(1), (0, 0)).unwrap();
        assert_eq!(grid.add(Occupant::Bug(2), (0, 0)), Err(WorldError::PositionUsed));
        assert_eq!(grid.add(Occupant::Bug(2), (4, 0)), Err(WorldError::OutOfRange));
    }

    #[test]
    fn food_cannot_move() {
        let mut grid = Grid::new(4, 4);
        grid.add(Occupant::Food(1), (0, 0)).unwrap();
        assert_eq!(grid.move_occupant((0, 0), (1, 0)), Err(WorldError::NotMovable));
    }

    #[test]
    fn sixteen_forward_moves_on_a_4x4_grid_wrap_home() {
        let mut grid = Grid::new(4, 4);
        grid.add(Occupant::Bug(1), (0, 0)).unwrap();
        let mut position = (0, 0);
        for _ in 0..16 {
            let next = grid.cell_in_front(position, Orientation::North);
            grid.move_occupant(position, next).unwrap();
            position = next;
        }
        assert_eq!(position, (0, 0));
    }

    #[test]
    fn unused_position_fails_with_world_full_when_saturated() {
        let mut grid = Grid::new(1, 1);
        grid.add(Occupant::Bug(1), (0, 0)).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(grid.unused_position(None, &mut rng), Err(WorldError::WorldFull));
    }
}
