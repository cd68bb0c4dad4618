//! Maze data: the immutable grid the field simulation walks on.
//!
//! Passability is layered. Besides plain walls and open floor, a maze carries
//! gate tiles keyed by the two active layer indices (`depth0`, advanced by
//! switches, and `depth1`, advanced by doors) and ladder tiles that join
//! floors and can only be entered vertically. Every query is a pure function of
//! its arguments; out-of-range coordinates answer with the wall / no-feature
//! default instead of failing.
//!
//! Coordinates: x grows to the right, y grows upward (toward higher floors).
//! Maze files list their rows top row first, so row `i` of the file is
//! `y = height - 1 - i`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Edge length of one cell in pixels.
pub const TILE_SIZE: i32 = 32;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Layer pair a gate opens under. `None` matches every index.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GateKey {
    #[serde(default)]
    pub depth0: Option<usize>,
    #[serde(default)]
    pub depth1: Option<usize>,
}

impl GateKey {
    pub const fn exact(depth0: usize, depth1: usize) -> Self {
        Self {
            depth0: Some(depth0),
            depth1: Some(depth1),
        }
    }

    pub fn is_open(self, depth0: usize, depth1: usize) -> bool {
        self.depth0.map_or(true, |d| d == depth0) && self.depth1.map_or(true, |d| d == depth1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Open,
    /// Shaft between floors. Only vertical entry is allowed.
    Ladder,
    Gate(GateKey),
}

/// What the renderer should draw for one cell under the current layer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileAppearance {
    Wall,
    Floor,
    Ladder,
    GateOpen,
    GateClosed,
    Switch { active: bool },
    Door { active: bool },
    Goal,
}

#[derive(Debug, Clone)]
pub struct MazeData {
    pub version: String,
    pub maze_id: String,
    width: i32,
    height: i32,
    depth0_count: usize,
    depth1_count: usize,
    floor_height: i32,
    floor_count: i32,
    tiles: Vec<Tile>,
    switches: HashMap<Cell, usize>,
    doors: HashMap<Cell, usize>,
    goal: Cell,
    start: Cell,
}

impl MazeData {
    /// Assemble a maze from already-validated parts. The generator and the
    /// file loader are the only callers.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        maze_id: String,
        version: String,
        width: i32,
        height: i32,
        depths: (usize, usize),
        floor_height: i32,
        tiles: Vec<Tile>,
        switches: HashMap<Cell, usize>,
        doors: HashMap<Cell, usize>,
        start: Cell,
        goal: Cell,
    ) -> Self {
        debug_assert_eq!(tiles.len(), width as usize * height as usize);
        let floor_height = floor_height.max(1);
        // Row 0 is the bottom slab; floors cover the rows above it.
        let rows = (height - 1).max(0);
        let floor_count = (rows / floor_height + i32::from(rows % floor_height != 0)).max(1);
        Self {
            version,
            maze_id,
            width,
            height,
            depth0_count: depths.0.max(1),
            depth1_count: depths.1.max(1),
            floor_height,
            floor_count,
            tiles,
            switches,
            doors,
            goal,
            start,
        }
    }

    pub fn from_file(file: MazeFile) -> Result<Self, String> {
        validate_maze_file(&file)?;

        let (width, height) = grid_size(file.rows[0].chars().count(), file.rows.len())?;
        let gate_keys: HashMap<Cell, GateKey> = file
            .gates
            .iter()
            .map(|gate| (Cell::new(gate.x, gate.y), gate.key))
            .collect();

        let mut tiles = vec![Tile::Wall; width as usize * height as usize];
        for (row_index, row) in file.rows.iter().enumerate() {
            let y = height - 1 - row_index as i32;
            for (col, ch) in row.chars().enumerate() {
                let x = col as i32;
                let tile = match ch {
                    '#' => Tile::Wall,
                    '.' => Tile::Open,
                    'H' => Tile::Ladder,
                    'g' => Tile::Gate(gate_keys[&Cell::new(x, y)]),
                    _ => unreachable!("validated above"),
                };
                tiles[(y * width + x) as usize] = tile;
            }
        }

        let switches = file
            .switches
            .iter()
            .map(|s| (Cell::new(s.x, s.y), s.depth1))
            .collect();
        let doors = file
            .doors
            .iter()
            .map(|d| (Cell::new(d.x, d.y), d.depth0))
            .collect();

        Ok(Self::from_parts(
            file.maze_id,
            file.version,
            width,
            height,
            (file.depth0, file.depth1),
            file.floor_height.unwrap_or(height),
            tiles,
            switches,
            doors,
            file.start,
            file.goal,
        ))
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of switch-controlled layer variants (D0).
    pub fn depth0_count(&self) -> usize {
        self.depth0_count
    }

    /// Number of door-controlled layer variants (D1).
    pub fn depth1_count(&self) -> usize {
        self.depth1_count
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn tile(&self, x: i32, y: i32) -> Tile {
        if !self.in_bounds(x, y) {
            return Tile::Wall;
        }
        self.tiles[(y * self.width + x) as usize]
    }

    /// Whether (x, y) can be entered while the player stands on row `row_y`.
    pub fn passable(&self, x: i32, y: i32, row_y: i32, depth0: usize, depth1: usize) -> bool {
        match self.tile(x, y) {
            Tile::Wall => false,
            Tile::Open => true,
            Tile::Ladder => row_y != y,
            Tile::Gate(key) => key.is_open(depth0, depth1),
        }
    }

    pub fn is_goal(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.goal == Cell::new(x, y)
    }

    pub fn has_switch(&self, x: i32, y: i32, depth1: usize) -> bool {
        self.switch_at(Cell::new(x, y)) == Some(depth1)
    }

    pub fn has_door(&self, x: i32, y: i32, depth0: usize) -> bool {
        self.door_at(Cell::new(x, y)) == Some(depth0)
    }

    /// The depth1 value a switch at `cell` answers to, if any.
    pub fn switch_at(&self, cell: Cell) -> Option<usize> {
        self.switches.get(&cell).copied()
    }

    /// The depth0 value a door at `cell` answers to, if any.
    pub fn door_at(&self, cell: Cell) -> Option<usize> {
        self.doors.get(&cell).copied()
    }

    pub fn switches(&self) -> impl Iterator<Item = (Cell, usize)> + '_ {
        self.switches.iter().map(|(cell, tag)| (*cell, *tag))
    }

    pub fn doors(&self) -> impl Iterator<Item = (Cell, usize)> + '_ {
        self.doors.iter().map(|(cell, tag)| (*cell, *tag))
    }

    /// 1-based floor of row `y`, clamped to the generated floors.
    pub fn floor_number(&self, y: i32) -> i32 {
        (y - 1).div_euclid(self.floor_height).clamp(0, self.floor_count - 1) + 1
    }

    pub fn floor_count(&self) -> i32 {
        self.floor_count
    }

    pub fn appearance(&self, x: i32, y: i32, depth0: usize, depth1: usize) -> TileAppearance {
        let cell = Cell::new(x, y);
        if self.is_goal(x, y) {
            return TileAppearance::Goal;
        }
        if let Some(tag) = self.switch_at(cell) {
            return TileAppearance::Switch {
                active: tag == depth1,
            };
        }
        if let Some(tag) = self.door_at(cell) {
            return TileAppearance::Door {
                active: tag == depth0,
            };
        }
        match self.tile(x, y) {
            Tile::Wall => TileAppearance::Wall,
            Tile::Open => TileAppearance::Floor,
            Tile::Ladder => TileAppearance::Ladder,
            Tile::Gate(key) if key.is_open(depth0, depth1) => TileAppearance::GateOpen,
            Tile::Gate(_) => TileAppearance::GateClosed,
        }
    }
}

// --- Hand-authored maze files ---

#[derive(Debug, Deserialize, Clone)]
pub struct MazeFile {
    pub version: String,
    pub maze_id: String,
    #[serde(default = "default_depth")]
    pub depth0: usize,
    #[serde(default = "default_depth")]
    pub depth1: usize,
    /// Rows per floor. Defaults to a single floor spanning the maze.
    #[serde(default)]
    pub floor_height: Option<i32>,
    pub rows: Vec<String>,
    #[serde(default)]
    pub gates: Vec<GateEntry>,
    #[serde(default)]
    pub switches: Vec<SwitchEntry>,
    #[serde(default)]
    pub doors: Vec<DoorEntry>,
    #[serde(default = "default_start")]
    pub start: Cell,
    pub goal: Cell,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct GateEntry {
    pub x: i32,
    pub y: i32,
    #[serde(flatten)]
    pub key: GateKey,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SwitchEntry {
    pub x: i32,
    pub y: i32,
    pub depth1: usize,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct DoorEntry {
    pub x: i32,
    pub y: i32,
    pub depth0: usize,
}

pub fn load_maze_from_path(path: &Path) -> Result<MazeData, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read maze file {}: {e}", path.display()))?;
    let file: MazeFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse maze JSON {}: {e}", path.display()))?;
    let maze = MazeData::from_file(file)
        .map_err(|e| format!("{e} (in {})", path.display()))?;
    log::info!(
        "Loaded maze '{}' ({}x{}, {} floors)",
        maze.maze_id,
        maze.width(),
        maze.height(),
        maze.floor_count()
    );
    Ok(maze)
}

fn validate_maze_file(file: &MazeFile) -> Result<(), String> {
    if file.rows.is_empty() {
        return Err("Maze validation failed: rows array is empty".to_string());
    }
    if file.depth0 == 0 || file.depth1 == 0 {
        return Err("Maze validation failed: depth0 and depth1 must be >= 1".to_string());
    }
    if matches!(file.floor_height, Some(h) if h <= 0) {
        return Err("Maze validation failed: floor_height must be > 0".to_string());
    }

    let width = file.rows[0].chars().count();
    let (_, height) = grid_size(width, file.rows.len())?;
    if width == 0 {
        return Err("Maze validation failed: rows are empty strings".to_string());
    }
    let mut gate_cells = HashSet::new();
    let mut walls = HashSet::new();
    for (row_index, row) in file.rows.iter().enumerate() {
        if row.chars().count() != width {
            return Err(format!(
                "Maze validation failed: row {row_index} has width {} (expected {width})",
                row.chars().count()
            ));
        }
        let y = height - 1 - row_index as i32;
        for (col, ch) in row.chars().enumerate() {
            let cell = Cell::new(col as i32, y);
            match ch {
                '#' => {
                    walls.insert(cell);
                }
                '.' | 'H' => {}
                'g' => {
                    gate_cells.insert(cell);
                }
                other => {
                    return Err(format!(
                        "Maze validation failed: unknown tile '{other}' at ({}, {})",
                        cell.x, cell.y
                    ));
                }
            }
        }
    }

    let width = width as i32;
    let in_bounds = |cell: Cell| cell.x >= 0 && cell.x < width && cell.y >= 0 && cell.y < height;
    let walkable = |cell: Cell| in_bounds(cell) && !walls.contains(&cell);

    let mut listed_gates = HashSet::new();
    for gate in &file.gates {
        let cell = Cell::new(gate.x, gate.y);
        if !gate_cells.contains(&cell) {
            return Err(format!(
                "Maze validation failed: gate entry at ({}, {}) is not a 'g' tile",
                cell.x, cell.y
            ));
        }
        if !listed_gates.insert(cell) {
            return Err(format!(
                "Maze validation failed: duplicate gate entry at ({}, {})",
                cell.x, cell.y
            ));
        }
        check_tag("gate depth0", gate.key.depth0, file.depth0)?;
        check_tag("gate depth1", gate.key.depth1, file.depth1)?;
    }
    if let Some(missing) = gate_cells.iter().find(|cell| !listed_gates.contains(cell)) {
        return Err(format!(
            "Maze validation failed: gate tile at ({}, {}) has no gate entry",
            missing.x, missing.y
        ));
    }

    for switch in &file.switches {
        let cell = Cell::new(switch.x, switch.y);
        if !walkable(cell) {
            return Err(format!(
                "Maze validation failed: switch at ({}, {}) is not on a walkable tile",
                cell.x, cell.y
            ));
        }
        check_tag("switch depth1", Some(switch.depth1), file.depth1)?;
    }
    for door in &file.doors {
        let cell = Cell::new(door.x, door.y);
        if !walkable(cell) {
            return Err(format!(
                "Maze validation failed: door at ({}, {}) is not on a walkable tile",
                cell.x, cell.y
            ));
        }
        check_tag("door depth0", Some(door.depth0), file.depth0)?;
    }

    if !walkable(file.goal) {
        return Err("Maze validation failed: goal is not on a walkable tile".to_string());
    }
    if !walkable(file.start) {
        return Err("Maze validation failed: start is not on a walkable tile".to_string());
    }

    Ok(())
}

/// Width and height as grid coordinates. Fails when the cell count would not
/// fit an `i32`.
fn grid_size(width: usize, height: usize) -> Result<(i32, i32), String> {
    let too_large = || format!("Maze validation failed: {width}x{height} maze is too large");
    let w = i32::try_from(width).map_err(|_| too_large())?;
    let h = i32::try_from(height).map_err(|_| too_large())?;
    w.checked_mul(h).ok_or_else(too_large)?;
    Ok((w, h))
}

fn check_tag(what: &str, tag: Option<usize>, count: usize) -> Result<(), String> {
    match tag {
        Some(value) if value >= count => Err(format!(
            "Maze validation failed: {what} {value} out of range (count {count})"
        )),
        _ => Ok(()),
    }
}

const fn default_depth() -> usize {
    1
}

const fn default_start() -> Cell {
    Cell::new(1, 1)
}
