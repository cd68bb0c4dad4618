//! Layered maze generation.
//!
//! Every floor is a perfect maze carved with Kruskal's algorithm over a
//! union-find, cells on odd coordinates and walls on even ones. Floors are
//! stacked bottom to top and joined by a single ladder in the slab row between
//! them, so the whole maze is still a tree and the start→goal route is unique.
//!
//! Gates are then dropped onto connector cells of that route, cutting it into
//! regions. Region `r` receives a switch tagged with its own depth1 and a door
//! tagged with the next gate's depth0. Whatever the player does inside a region,
//! either depth0 still matches the door or depth1 still matches the switch, so
//! the next gate's layer pair can always be dialled in and no generated maze
//! can soft-lock.

use crate::maze::{Cell, GateKey, MazeData, Tile};
use maze_core::Difficulty;
use rand::prelude::*;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MazeParams {
    /// Maze cells per row on each floor.
    pub columns: i32,
    /// Maze cells per column on each floor.
    pub rows_per_floor: i32,
    pub floors: i32,
    pub depth0: usize,
    pub depth1: usize,
    pub gates: usize,
    pub seed: u64,
}

impl MazeParams {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                columns: 7,
                rows_per_floor: 3,
                floors: 2,
                depth0: 2,
                depth1: 1,
                gates: 2,
                seed: 0x5EED_0001,
            },
            Difficulty::Normal => Self {
                columns: 9,
                rows_per_floor: 4,
                floors: 3,
                depth0: 3,
                depth1: 2,
                gates: 4,
                seed: 0x5EED_0002,
            },
            Difficulty::Hard => Self {
                columns: 11,
                rows_per_floor: 5,
                floors: 4,
                depth0: 4,
                depth1: 3,
                gates: 6,
                seed: 0x5EED_0003,
            },
        }
    }

    pub fn width(&self) -> i32 {
        self.columns * 2 + 1
    }

    pub fn floor_height(&self) -> i32 {
        self.rows_per_floor * 2
    }

    pub fn height(&self) -> i32 {
        self.floors * self.floor_height() + 1
    }
}

/// Generate the maze for `difficulty` with its built-in seed.
pub fn generate(difficulty: Difficulty) -> MazeData {
    generate_with_seed(difficulty, MazeParams::for_difficulty(difficulty).seed)
}

pub fn generate_with_seed(difficulty: Difficulty, seed: u64) -> MazeData {
    let params = MazeParams {
        seed,
        ..MazeParams::for_difficulty(difficulty)
    };
    let maze_id = format!("{}-{seed:x}", difficulty.label().to_ascii_lowercase());
    generate_from_params(&params, maze_id)
}

pub fn generate_from_params(params: &MazeParams, maze_id: String) -> MazeData {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut grid = Grid::new(params.width(), params.height());

    for floor in 0..params.floors {
        carve_floor(&mut grid, params, floor, &mut rng);
    }
    for floor in 0..params.floors - 1 {
        let x = rng.gen_range(0..params.columns) * 2 + 1;
        let y = (floor + 1) * params.floor_height();
        grid.set(Cell::new(x, y), Tile::Ladder);
    }

    let start = Cell::new(1, 1);
    let (distance, parent) = grid.walk_tree(start);
    let goal = farthest_top_floor_cell(params, &distance);
    let path = route(&parent, start, goal);

    let gate_cells = choose_gate_cells(&grid, &path, params.gates);
    let pairs = layer_schedule(params, gate_cells.len(), &mut rng);
    for (index, cell) in gate_cells.iter().enumerate() {
        let (depth0, depth1) = pairs[index + 1];
        grid.set(*cell, Tile::Gate(GateKey::exact(depth0, depth1)));
    }

    let regions = grid.regions(start, &gate_cells);
    let mut switches = HashMap::new();
    let mut doors = HashMap::new();
    for region in 0..gate_cells.len() {
        let (switch_cell, door_cell) =
            pick_device_cells(&grid, &regions, region, start, goal, &mut rng);
        // Region r: the switch answers to the depth1 the player arrives with,
        // the door to the depth0 the next gate wants.
        switches.insert(switch_cell, pairs[region].1);
        doors.insert(door_cell, pairs[region + 1].0);
    }

    log::debug!(
        "Generated maze '{}': {}x{}, {} floors, {} gates, route length {}",
        maze_id,
        params.width(),
        params.height(),
        params.floors,
        gate_cells.len(),
        path.len()
    );

    MazeData::from_parts(
        maze_id,
        "generated".to_string(),
        params.width(),
        params.height(),
        (params.depth0, params.depth1),
        params.floor_height(),
        grid.tiles,
        switches,
        doors,
        start,
        goal,
    )
}

fn carve_floor(grid: &mut Grid, params: &MazeParams, floor: i32, rng: &mut StdRng) {
    let columns = params.columns;
    let rows = params.rows_per_floor;
    let base_y = floor * params.floor_height();
    let cell_at = |cx: i32, cy: i32| Cell::new(cx * 2 + 1, base_y + cy * 2 + 1);
    let index = |cx: i32, cy: i32| (cy * columns + cx) as usize;

    let mut edges = Vec::new();
    for cy in 0..rows {
        for cx in 0..columns {
            grid.set(cell_at(cx, cy), Tile::Open);
            if cx + 1 < columns {
                edges.push(((cx, cy), (cx + 1, cy)));
            }
            if cy + 1 < rows {
                edges.push(((cx, cy), (cx, cy + 1)));
            }
        }
    }
    edges.shuffle(rng);

    let mut sets = UnionFind::new((columns * rows) as usize);
    for ((ax, ay), (bx, by)) in edges {
        if sets.union(index(ax, ay), index(bx, by)) {
            let a = cell_at(ax, ay);
            let b = cell_at(bx, by);
            grid.set(Cell::new((a.x + b.x) / 2, (a.y + b.y) / 2), Tile::Open);
        }
    }
}

fn farthest_top_floor_cell(params: &MazeParams, distance: &HashMap<Cell, usize>) -> Cell {
    let top_base = (params.floors - 1) * params.floor_height();
    let mut best = Cell::new(1, top_base + 1);
    let mut best_distance = 0;
    for cy in 0..params.rows_per_floor {
        for cx in 0..params.columns {
            let cell = Cell::new(cx * 2 + 1, top_base + cy * 2 + 1);
            if let Some(&d) = distance.get(&cell) {
                if d > best_distance {
                    best = cell;
                    best_distance = d;
                }
            }
        }
    }
    best
}

fn route(parent: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match parent.get(&current) {
            Some(&previous) => {
                path.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Spread up to `count` gates evenly over the open connectors of `path`.
fn choose_gate_cells(grid: &Grid, path: &[Cell], count: usize) -> Vec<Cell> {
    let connectors: Vec<Cell> = path
        .iter()
        .copied()
        .filter(|cell| (cell.x % 2 == 0 || cell.y % 2 == 0) && grid.get(*cell) == Tile::Open)
        .collect();
    let count = count.min(connectors.len());
    let mut picks: Vec<usize> = (0..count)
        .map(|k| (k + 1) * connectors.len() / (count + 1))
        .collect();
    picks.dedup();
    picks.into_iter().map(|i| connectors[i]).collect()
}

/// Layer pair for each gate, prefixed by the starting pair (0, 0). Consecutive
/// pairs differ whenever there is more than one pair to choose from.
fn layer_schedule(params: &MazeParams, gates: usize, rng: &mut StdRng) -> Vec<(usize, usize)> {
    let mut pairs = vec![(0, 0)];
    for _ in 0..gates {
        let previous = pairs[pairs.len() - 1];
        let mut next = previous;
        if params.depth0 * params.depth1 > 1 {
            while next == previous {
                next = (rng.gen_range(0..params.depth0), rng.gen_range(0..params.depth1));
            }
        }
        pairs.push(next);
    }
    pairs
}

fn pick_device_cells(
    grid: &Grid,
    regions: &HashMap<Cell, usize>,
    region: usize,
    start: Cell,
    goal: Cell,
    rng: &mut StdRng,
) -> (Cell, Cell) {
    let mut cells: Vec<Cell> = regions
        .iter()
        .filter(|(cell, r)| **r == region && cell.x % 2 == 1 && cell.y % 2 == 1)
        .map(|(cell, _)| *cell)
        .filter(|cell| *cell != goal && *cell != start)
        .collect();
    // HashMap order is not stable; sort before drawing from the rng.
    cells.sort_by_key(|cell| (cell.y, cell.x));
    if cells.is_empty() {
        return (start, start);
    }

    let mut dead_ends: Vec<Cell> = cells
        .iter()
        .copied()
        .filter(|cell| grid.open_neighbours(*cell) == 1)
        .collect();
    let switch_cell = pick_preferring(&mut dead_ends, &mut cells, rng);
    let door_cell = if cells.is_empty() {
        switch_cell
    } else {
        pick_preferring(&mut dead_ends, &mut cells, rng)
    };
    (switch_cell, door_cell)
}

/// Remove and return a random cell, drawing from `preferred` while it has
/// entries. Both lists stay in sync.
fn pick_preferring(preferred: &mut Vec<Cell>, all: &mut Vec<Cell>, rng: &mut StdRng) -> Cell {
    let cell = if preferred.is_empty() {
        all[rng.gen_range(0..all.len())]
    } else {
        preferred.swap_remove(rng.gen_range(0..preferred.len()))
    };
    all.retain(|c| *c != cell);
    cell
}

const NEIGHBOURS: [(i32, i32); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];

struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Wall; (width * height) as usize],
        }
    }

    fn get(&self, cell: Cell) -> Tile {
        if cell.x < 0 || cell.x >= self.width || cell.y < 0 || cell.y >= self.height {
            return Tile::Wall;
        }
        self.tiles[(cell.y * self.width + cell.x) as usize]
    }

    fn set(&mut self, cell: Cell, tile: Tile) {
        self.tiles[(cell.y * self.width + cell.x) as usize] = tile;
    }

    fn open_neighbours(&self, cell: Cell) -> usize {
        NEIGHBOURS
            .iter()
            .filter(|(dx, dy)| self.get(Cell::new(cell.x + dx, cell.y + dy)) != Tile::Wall)
            .count()
    }

    /// Breadth-first walk over every non-wall tile, ignoring layer gating.
    fn walk_tree(&self, start: Cell) -> (HashMap<Cell, usize>, HashMap<Cell, Cell>) {
        let mut distance = HashMap::from([(start, 0)]);
        let mut parent = HashMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            let d = distance[&cell];
            for (dx, dy) in NEIGHBOURS {
                let next = Cell::new(cell.x + dx, cell.y + dy);
                if self.get(next) == Tile::Wall || distance.contains_key(&next) {
                    continue;
                }
                distance.insert(next, d + 1);
                parent.insert(next, cell);
                queue.push_back(next);
            }
        }
        (distance, parent)
    }

    /// Region index per tile: 0 before the first gate, `i + 1` from gate `i` on.
    fn regions(&self, start: Cell, gates: &[Cell]) -> HashMap<Cell, usize> {
        let mut regions = HashMap::from([(start, 0)]);
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            let region = regions[&cell];
            for (dx, dy) in NEIGHBOURS {
                let next = Cell::new(cell.x + dx, cell.y + dy);
                if self.get(next) == Tile::Wall || regions.contains_key(&next) {
                    continue;
                }
                let next_region = gates
                    .iter()
                    .position(|gate| *gate == next)
                    .map_or(region, |i| i + 1);
                regions.insert(next, next_region);
                queue.push_back(next);
            }
        }
        regions
    }
}

/// Union-find over dense indices with path compression and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, item: usize) -> usize {
        if self.parent[item] != item {
            let root = self.find(self.parent[item]);
            self.parent[item] = root;
        }
        self.parent[item]
    }

    /// Returns true if the sets were merged, false if already joined.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::TileAppearance;

    fn snapshot(maze: &MazeData) -> Vec<TileAppearance> {
        let mut out = Vec::new();
        for y in 0..maze.height() {
            for x in 0..maze.width() {
                out.push(maze.appearance(x, y, 0, 0));
            }
        }
        out
    }

    fn count_tiles(maze: &MazeData, wanted: fn(Tile) -> bool) -> usize {
        (0..maze.height())
            .flat_map(|y| (0..maze.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| wanted(maze.tile(x, y)))
            .count()
    }

    #[test]
    fn dimensions_follow_params() {
        for &difficulty in Difficulty::ALL {
            let params = MazeParams::for_difficulty(difficulty);
            let maze = generate(difficulty);
            assert_eq!(maze.width(), params.width());
            assert_eq!(maze.height(), params.height());
            assert_eq!(maze.floor_count(), params.floors);
            assert_eq!(maze.depth0_count(), params.depth0);
            assert_eq!(maze.depth1_count(), params.depth1);
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generate_with_seed(Difficulty::Hard, 42);
        let b = generate_with_seed(Difficulty::Hard, 42);
        assert_eq!(snapshot(&a), snapshot(&b));
        assert_eq!(a.goal(), b.goal());
        assert_eq!(a.maze_id, b.maze_id);
    }

    #[test]
    fn different_seeds_change_the_layout() {
        let a = generate_with_seed(Difficulty::Hard, 1);
        let b = generate_with_seed(Difficulty::Hard, 2);
        assert_ne!(snapshot(&a), snapshot(&b));
    }

    #[test]
    fn border_is_solid() {
        let maze = generate(Difficulty::Normal);
        for x in 0..maze.width() {
            assert_eq!(maze.tile(x, 0), Tile::Wall);
            assert_eq!(maze.tile(x, maze.height() - 1), Tile::Wall);
        }
        for y in 0..maze.height() {
            assert_eq!(maze.tile(0, y), Tile::Wall);
            assert_eq!(maze.tile(maze.width() - 1, y), Tile::Wall);
        }
    }

    #[test]
    fn floors_are_joined_by_single_ladders() {
        for &difficulty in Difficulty::ALL {
            let params = MazeParams::for_difficulty(difficulty);
            let maze = generate(difficulty);
            let ladders = count_tiles(&maze, |t| t == Tile::Ladder);
            assert_eq!(ladders as i32, params.floors - 1);
            for floor in 1..params.floors {
                let y = floor * params.floor_height();
                let in_slab = (0..maze.width())
                    .filter(|&x| maze.tile(x, y) != Tile::Wall)
                    .count();
                assert_eq!(in_slab, 1, "slab row {y} should hold only the ladder");
            }
        }
    }

    #[test]
    fn goal_sits_on_top_floor_and_start_is_open() {
        for &difficulty in Difficulty::ALL {
            let maze = generate(difficulty);
            let goal = maze.goal();
            assert_eq!(maze.floor_number(goal.y), maze.floor_count());
            assert_eq!(maze.tile(goal.x, goal.y), Tile::Open);
            assert_eq!(maze.start(), Cell::new(1, 1));
            assert_eq!(maze.tile(1, 1), Tile::Open);
        }
    }

    #[test]
    fn every_region_gets_a_switch_and_a_door() {
        for &difficulty in Difficulty::ALL {
            let params = MazeParams::for_difficulty(difficulty);
            let maze = generate(difficulty);
            let gates = count_tiles(&maze, |t| matches!(t, Tile::Gate(_)));
            assert!(gates >= 1 && gates <= params.gates);
            assert!(maze.switches().count() >= 1);
            assert!(maze.switches().count() <= gates);
            for (cell, tag) in maze.switches() {
                assert!(tag < maze.depth1_count());
                assert_ne!(maze.tile(cell.x, cell.y), Tile::Wall);
            }
            for (cell, tag) in maze.doors() {
                assert!(tag < maze.depth0_count());
                assert_ne!(maze.tile(cell.x, cell.y), Tile::Wall);
            }
        }
    }

    #[test]
    fn first_gate_is_closed_at_start() {
        let maze = generate(Difficulty::Normal);
        let closed = (0..maze.height())
            .flat_map(|y| (0..maze.width()).map(move |x| (x, y)))
            .any(|(x, y)| maze.appearance(x, y, 0, 0) == TileAppearance::GateClosed);
        assert!(closed, "at least one gate must block the starting layer pair");
    }

    #[test]
    fn union_find_merges_once() {
        let mut sets = UnionFind::new(4);
        assert!(sets.union(0, 1));
        assert!(sets.union(2, 3));
        assert!(!sets.union(1, 0));
        assert!(sets.union(1, 3));
        assert_eq!(sets.find(0), sets.find(2));
    }
}
