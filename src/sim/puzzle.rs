//! Tile-rotation connectivity puzzle
//!
//! An N×N grid hides a path from a start tile in the leftmost column to an end
//! tile in the rightmost column. Every tile is scrambled with a random
//! rotation; the player rotates tiles until a breadth-first search over the
//! rotated connectors reaches the end.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Smallest grid that leaves room for a start row off the edges
pub const MIN_GRID_SIZE: usize = 3;

/// Walks that dead-end are retried this many times before falling back to a
/// straight corridor
const MAX_WALK_ATTEMPTS: usize = 64;

/// Chance of stepping right while far from the right edge
const RIGHTWARD_BIAS: f32 = 0.7;

/// Tile edge, clockwise from the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Top, Direction::Right, Direction::Bottom, Direction::Left];

    pub fn index(self) -> usize {
        match self {
            Direction::Top => 0,
            Direction::Right => 1,
            Direction::Bottom => 2,
            Direction::Left => 3,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// Direction after turning the tile clockwise by `rotation`
    pub fn rotated_by(self, rotation: Rotation) -> Direction {
        match rotation {
            Rotation::R0 => self,
            Rotation::R90 => match self {
                Direction::Top => Direction::Right,
                Direction::Right => Direction::Bottom,
                Direction::Bottom => Direction::Left,
                Direction::Left => Direction::Top,
            },
            Rotation::R180 => self.opposite(),
            Rotation::R270 => match self {
                Direction::Top => Direction::Left,
                Direction::Right => Direction::Top,
                Direction::Bottom => Direction::Right,
                Direction::Left => Direction::Bottom,
            },
        }
    }

    /// Neighbor cell across this edge, if it is on the grid
    pub fn step(self, row: usize, col: usize, size: usize) -> Option<(usize, usize)> {
        match self {
            Direction::Top => row.checked_sub(1).map(|r| (r, col)),
            Direction::Right => (col + 1 < size).then_some((row, col + 1)),
            Direction::Bottom => (row + 1 < size).then_some((row + 1, col)),
            Direction::Left => col.checked_sub(1).map(|c| (row, c)),
        }
    }
}

/// Clockwise quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// One more quarter turn (wraps 270° back to 0°)
    pub fn turn(self) -> Rotation {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    pub fn radians(self) -> f32 {
        (self.degrees() as f32).to_radians()
    }

    pub fn random<R: Rng>(rng: &mut R) -> Rotation {
        Rotation::ALL[rng.random_range(0..4)]
    }
}

/// Open edges in [top, right, bottom, left] order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Connectors(pub [bool; 4]);

impl Connectors {
    pub fn has(&self, dir: Direction) -> bool {
        self.0[dir.index()]
    }

    pub fn set(&mut self, dir: Direction) {
        self.0[dir.index()] = true;
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&open| open).count()
    }

    /// Effective connectors once the tile is turned by `rotation`
    pub fn rotated(self, rotation: Rotation) -> Connectors {
        let mut out = Connectors::default();
        for dir in Direction::ALL {
            if self.has(dir) {
                out.set(dir.rotated_by(rotation));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Start,
    End,
    Straight,
    Corner,
    TJunction,
    Cross,
    /// Filler outside the path, no connectors
    Blank,
}

impl TileKind {
    /// Path tile shape implied by its connectors
    fn from_connectors(c: Connectors) -> TileKind {
        match c.count() {
            2 if c.has(Direction::Top) == c.has(Direction::Bottom) => TileKind::Straight,
            2 => TileKind::Corner,
            3 => TileKind::TJunction,
            4 => TileKind::Cross,
            _ => TileKind::Blank,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub rotation: Rotation,
    /// Connectors in the unrotated orientation
    pub base: Connectors,
}

impl Tile {
    pub fn blank() -> Self {
        Self {
            kind: TileKind::Blank,
            rotation: Rotation::R0,
            base: Connectors::default(),
        }
    }

    pub fn effective(&self) -> Connectors {
        self.base.rotated(self.rotation)
    }
}

/// Square, row-major tile grid. Never resized after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Random solvable puzzle with every tile scrambled
    pub fn generate<R: Rng>(size: usize, rng: &mut R) -> Grid {
        let size = size.max(MIN_GRID_SIZE);
        let path = (0..MAX_WALK_ATTEMPTS)
            .find_map(|attempt| {
                let walk = random_walk(size, rng);
                if walk.is_none() {
                    log::warn!("Puzzle walk dead-ended (attempt {}), retrying", attempt + 1);
                }
                walk
            })
            .unwrap_or_else(|| {
                let row = size / 2;
                (0..size).map(|col| (row, col)).collect()
            });

        let mut grid = Grid::from_path(size, &path);
        loop {
            grid.scramble(rng);
            if !grid.is_solved() {
                break;
            }
            log::debug!("Scramble left the puzzle solved, scrambling again");
        }
        grid
    }

    /// Unscrambled grid whose path visits `path` cells in order, as (row, col).
    /// The first cell becomes the start, the last the end.
    pub fn from_path(size: usize, path: &[(usize, usize)]) -> Grid {
        let mut tiles = vec![Tile::blank(); size * size];
        for (i, &(row, col)) in path.iter().enumerate() {
            let mut base = Connectors::default();
            let neighbors = [i.checked_sub(1).map(|p| path[p]), path.get(i + 1).copied()];
            for (r, c) in neighbors.into_iter().flatten() {
                let dir = if r < row {
                    Direction::Top
                } else if r > row {
                    Direction::Bottom
                } else if c < col {
                    Direction::Left
                } else {
                    Direction::Right
                };
                base.set(dir);
            }
            let kind = if i == 0 {
                TileKind::Start
            } else if i + 1 == path.len() {
                TileKind::End
            } else {
                TileKind::from_connectors(base)
            };
            tiles[row * size + col] = Tile {
                kind,
                rotation: Rotation::R0,
                base,
            };
        }
        Grid { size, tiles }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        if row < self.size && col < self.size {
            self.tiles.get(row * self.size + col)
        } else {
            None
        }
    }

    /// Tiles with their (row, col), row-major
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Tile)> {
        let size = self.size;
        self.tiles.iter().enumerate().map(move |(i, t)| ((i / size, i % size), t))
    }

    /// Turn one tile a quarter clockwise. Returns false for off-grid cells.
    pub fn rotate_tile(&mut self, row: usize, col: usize) -> bool {
        if row >= self.size || col >= self.size {
            return false;
        }
        let tile = &mut self.tiles[row * self.size + col];
        tile.rotation = tile.rotation.turn();
        true
    }

    pub fn start(&self) -> Option<(usize, usize)> {
        self.iter().find(|(_, t)| t.kind == TileKind::Start).map(|(pos, _)| pos)
    }

    /// BFS from the start tile; solved once the end tile in the rightmost column is reached
    pub fn is_solved(&self) -> bool {
        let Some(start) = self.start() else {
            return false;
        };
        let mut visited = vec![false; self.tiles.len()];
        let mut queue = VecDeque::from([start]);
        visited[start.0 * self.size + start.1] = true;

        while let Some((row, col)) = queue.pop_front() {
            let tile = &self.tiles[row * self.size + col];
            if tile.kind == TileKind::End && col == self.size - 1 {
                return true;
            }
            let open = tile.effective();
            for dir in Direction::ALL {
                if !open.has(dir) {
                    continue;
                }
                let Some((r, c)) = dir.step(row, col, self.size) else {
                    continue;
                };
                let idx = r * self.size + c;
                if !visited[idx] && self.tiles[idx].effective().has(dir.opposite()) {
                    visited[idx] = true;
                    queue.push_back((r, c));
                }
            }
        }
        false
    }

    /// Same grid with every tile back at its solving orientation
    pub fn unscrambled(&self) -> Grid {
        let mut grid = self.clone();
        for tile in grid.tiles.iter_mut() {
            tile.rotation = Rotation::R0;
        }
        grid
    }

    fn scramble<R: Rng>(&mut self, rng: &mut R) {
        for tile in self.tiles.iter_mut() {
            tile.rotation = Rotation::random(rng);
        }
    }
}

/// Self-avoiding walk from a start row off the edges to the rightmost column.
/// Backtracks out of dead ends; `None` if it runs out of room or steps.
fn random_walk<R: Rng>(size: usize, rng: &mut R) -> Option<Vec<(usize, usize)>> {
    let mut visited = vec![false; size * size];
    let start = (rng.random_range(1..size - 1), 0);
    visited[start.0 * size] = true;
    let mut path = vec![start];
    let mut budget = size * size * 8;

    while let Some(&(row, col)) = path.last() {
        if col == size - 1 {
            return Some(path);
        }
        budget = budget.checked_sub(1)?;

        let moves: Vec<(usize, usize)> = [Direction::Right, Direction::Top, Direction::Bottom]
            .into_iter()
            .filter_map(|dir| dir.step(row, col, size))
            .filter(|&(r, c)| !visited[r * size + c])
            .collect();
        if moves.is_empty() {
            path.pop();
            continue;
        }

        let right = (row, col + 1);
        let next = if col + 3 < size && moves.contains(&right) && rng.random::<f32>() < RIGHTWARD_BIAS {
            right
        } else {
            moves[rng.random_range(0..moves.len())]
        };
        visited[next.0 * size + next.1] = true;
        path.push(next);
    }
    None
}
