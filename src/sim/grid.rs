//! Tile grid and cell types
//!
//! The grid is a fixed-size row-major array. Border cells and interior cells
//! at even (x, y) are WALL for the lifetime of a level; everything else can be
//! mutated by explosions and pickups.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Integer grid coordinate (x = column, y = row)
pub type Pos = IVec2;

/// Power-up kinds that can sit on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUp {
    ExtraBomb,
    ExtraRange,
    Speed,
    Life,
    /// Danger-preview charges
    Radar,
    /// Grants a shield window
    ShieldVest,
}

impl PowerUp {
    pub const ALL: [PowerUp; 6] = [
        PowerUp::ExtraBomb,
        PowerUp::ExtraRange,
        PowerUp::Speed,
        PowerUp::Life,
        PowerUp::Radar,
        PowerUp::ShieldVest,
    ];
}

/// Contents of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    /// Indestructible
    Wall,
    /// Destructible
    Brick,
    Exit,
    /// Slippery floor, keeps the player sliding
    Ice,
    /// Lethal floor
    Lava,
    Key,
    /// Locked exit, opens when the key is held
    Gate,
    PowerUp(PowerUp),
}

impl Cell {
    /// Cells a blast ray travels through without stopping
    pub fn is_blast_passable(self) -> bool {
        !matches!(self, Cell::Wall | Cell::Brick)
    }

    /// Cells that are collected when the player steps on them
    pub fn is_pickup(self) -> bool {
        matches!(self, Cell::PowerUp(_) | Cell::Key)
    }
}

/// Orthogonal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    /// Ray order used by blasts and neighbor scans
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> Pos {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

/// Rectangular cell grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Grid with border walls, fixed pillars at even interior coordinates,
    /// and every other cell EMPTY.
    pub fn with_pillars(width: i32, height: i32) -> Self {
        let mut grid = Self {
            width,
            height,
            cells: vec![Cell::Empty; (width.max(0) * height.max(0)) as usize],
        };
        for y in 0..height {
            for x in 0..width {
                let pos = IVec2::new(x, y);
                if grid.is_fixed_wall(pos) {
                    grid.set(pos, Cell::Wall);
                }
            }
        }
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Border cell or interior pillar; these never change
    pub fn is_fixed_wall(&self, pos: Pos) -> bool {
        let border = pos.x == 0 || pos.y == 0 || pos.x == self.width - 1 || pos.y == self.height - 1;
        border || (pos.x % 2 == 0 && pos.y % 2 == 0)
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    /// Cell at `pos`, `None` when out of bounds
    pub fn get(&self, pos: Pos) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Out-of-bounds lookups read as WALL
    pub fn cell(&self, pos: Pos) -> Cell {
        self.get(pos).unwrap_or(Cell::Wall)
    }

    /// Writes are ignored out of bounds
    pub fn set(&mut self, pos: Pos, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    /// All coordinates in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| IVec2::new(x, y)))
    }

    /// Coordinates whose cell matches `pred`, row-major
    pub fn positions_where(&self, pred: impl Fn(Cell) -> bool) -> Vec<Pos> {
        self.positions().filter(|&p| pred(self.cell(p))).collect()
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// Replace every `from` cell with `to`, returning how many changed
    pub fn replace_all(&mut self, from: Cell, to: Cell) -> usize {
        let mut changed = 0;
        for c in self.cells.iter_mut().filter(|c| **c == from) {
            *c = to;
            changed += 1;
        }
        changed
    }

    /// Whether border and pillar walls are all intact
    pub fn has_fixed_walls(&self) -> bool {
        self.positions()
            .filter(|&p| self.is_fixed_wall(p))
            .all(|p| self.cell(p) == Cell::Wall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pillars_and_border() {
        let grid = Grid::with_pillars(15, 11);
        assert!(grid.has_fixed_walls());
        assert_eq!(grid.cell(IVec2::new(0, 5)), Cell::Wall);
        assert_eq!(grid.cell(IVec2::new(2, 2)), Cell::Wall);
        assert_eq!(grid.cell(IVec2::new(1, 1)), Cell::Empty);
        assert_eq!(grid.cell(IVec2::new(3, 2)), Cell::Empty);
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let mut grid = Grid::with_pillars(5, 5);
        assert_eq!(grid.get(IVec2::new(-1, 0)), None);
        assert_eq!(grid.cell(IVec2::new(5, 1)), Cell::Wall);
        grid.set(IVec2::new(9, 9), Cell::Brick);
        assert_eq!(grid.count(Cell::Brick), 0);
    }

    #[test]
    fn test_replace_all() {
        let mut grid = Grid::with_pillars(7, 7);
        grid.set(IVec2::new(1, 3), Cell::Gate);
        grid.set(IVec2::new(5, 5), Cell::Gate);
        assert_eq!(grid.replace_all(Cell::Gate, Cell::Exit), 2);
        assert_eq!(grid.count(Cell::Exit), 2);
    }
}
