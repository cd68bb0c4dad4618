use crate::draw::{self, DrawCommand, DrawContext, SpriteId};
use crate::generator;
use crate::maze::{Cell, MazeData, TILE_SIZE};
use maze_core::{Difficulty, InputState, Key};

/// Acceleration of a slide, in pixels per frame per frame. A move starts with
/// this speed and gains it again every frame until the tile is crossed.
pub const SLIDE_ACCEL: i32 = 3;

pub const UP_KEYS: &[Key] = &[Key::ArrowUp, Key::W];
pub const DOWN_KEYS: &[Key] = &[Key::ArrowDown, Key::S];
pub const LEFT_KEYS: &[Key] = &[Key::ArrowLeft, Key::A];
pub const RIGHT_KEYS: &[Key] = &[Key::ArrowRight, Key::D];
pub const ACTION_KEYS: &[Key] = &[Key::Space, Key::Enter];

/// Per-frame input snapshot consumed by the field. Directions are
/// level-triggered, the action is edge-triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub action: bool,
}

impl FieldInput {
    pub fn from_state(input: &InputState) -> Self {
        Self {
            up: input.any_held(UP_KEYS),
            down: input.any_held(DOWN_KEYS),
            left: input.any_held(LEFT_KEYS),
            right: input.any_held(RIGHT_KEYS),
            action: input.any_just_pressed(ACTION_KEYS),
        }
    }

    /// The direction that wins among simultaneous holds: Up, Down, Left, Right.
    pub fn direction(&self) -> Option<Direction> {
        if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn step(self, cell: Cell) -> Cell {
        let (dx, dy) = self.delta();
        Cell::new(cell.x + dx, cell.y + dy)
    }

    /// Primary key bound to this direction.
    pub fn key(self) -> Key {
        match self {
            Self::Up => Key::ArrowUp,
            Self::Down => Key::ArrowDown,
            Self::Left => Key::ArrowLeft,
            Self::Right => Key::ArrowRight,
        }
    }
}

/// Layer indices after pressing the action key on `cell`. The switch is
/// checked first; the door then sees the possibly advanced depth0.
pub fn apply_action(maze: &MazeData, cell: Cell, depth0: usize, depth1: usize) -> (usize, usize) {
    let mut depth0 = depth0;
    let mut depth1 = depth1;
    if maze.has_switch(cell.x, cell.y, depth1) {
        depth0 = (depth0 + 1) % maze.depth0_count();
    }
    if maze.has_door(cell.x, cell.y, depth0) {
        depth1 = (depth1 + 1) % maze.depth1_count();
    }
    (depth0, depth1)
}

/// Number of Moving frames a single-cell slide takes before it snaps.
pub fn slide_frame_count() -> u32 {
    let mut speed = SLIDE_ACCEL;
    let mut offset = SLIDE_ACCEL;
    let mut frames = 0;
    while offset < TILE_SIZE {
        speed += SLIDE_ACCEL;
        offset += speed;
        frames += 1;
    }
    frames
}

/// One play session on one maze: the player cell, the slide in flight and the
/// two active layer indices.
#[derive(Debug, Clone)]
pub struct FieldController {
    difficulty: Difficulty,
    maze: MazeData,
    player: Cell,
    dx: i32,
    dy: i32,
    speed: i32,
    depth0: usize,
    depth1: usize,
    goal_reached: bool,
}

impl FieldController {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_maze(difficulty, generator::generate(difficulty))
    }

    pub fn with_maze(difficulty: Difficulty, maze: MazeData) -> Self {
        Self {
            difficulty,
            player: maze.start(),
            maze,
            dx: 0,
            dy: 0,
            speed: 0,
            depth0: 0,
            depth1: 0,
            goal_reached: false,
        }
    }

    pub fn update(&mut self, input: &FieldInput) {
        if self.goal_reached {
            return;
        }

        if self.is_moving() {
            self.advance_slide();
            return;
        }

        if input.action {
            let (depth0, depth1) = apply_action(&self.maze, self.player, self.depth0, self.depth1);
            if depth0 != self.depth0 {
                log::debug!("Switch at {:?}: depth0 {} -> {}", self.player, self.depth0, depth0);
            }
            if depth1 != self.depth1 {
                log::debug!("Door at {:?}: depth1 {} -> {}", self.player, self.depth1, depth1);
            }
            self.depth0 = depth0;
            self.depth1 = depth1;
        }

        let Some(direction) = input.direction() else {
            return;
        };
        let next = direction.step(self.player);
        // The row context is the row the player is standing on.
        if !self
            .maze
            .passable(next.x, next.y, self.player.y, self.depth0, self.depth1)
        {
            return;
        }
        let (sx, sy) = direction.delta();
        self.dx = sx * SLIDE_ACCEL;
        self.dy = sy * SLIDE_ACCEL;
        self.speed = SLIDE_ACCEL;
    }

    fn advance_slide(&mut self) {
        self.speed += SLIDE_ACCEL;
        self.dx += self.dx.signum() * self.speed;
        self.dy += self.dy.signum() * self.speed;

        if self.dx.abs() < TILE_SIZE && self.dy.abs() < TILE_SIZE {
            return;
        }
        self.player.x += self.dx.signum();
        self.player.y += self.dy.signum();
        self.dx = 0;
        self.dy = 0;
        self.speed = 0;

        if self.maze.is_goal(self.player.x, self.player.y) {
            self.goal_reached = true;
            log::info!(
                "Goal reached at {:?} ({} / {})",
                self.player,
                self.maze.floor_number(self.player.y),
                self.maze.floor_count()
            );
        }
    }

    pub fn is_goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn is_moving(&self) -> bool {
        self.dx != 0 || self.dy != 0
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    /// Sub-cell slide offset in pixels.
    pub fn offset(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }

    pub fn depth0(&self) -> usize {
        self.depth0
    }

    pub fn depth1(&self) -> usize {
        self.depth1
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn maze(&self) -> &MazeData {
        &self.maze
    }

    pub fn floor_number(&self) -> i32 {
        self.maze.floor_number(self.player.y)
    }

    /// Push this frame's maze, player sprite and status text.
    pub fn draw(&self, ctx: &mut DrawContext) {
        let slide = self.offset();
        let offset = draw::camera_offset(ctx.screen, self.player, slide);
        ctx.push(DrawCommand::Maze {
            offset,
            depth0: self.depth0,
            depth1: self.depth1,
        });
        ctx.push(DrawCommand::Sprite {
            sprite: SpriteId::Player,
            position: draw::player_screen_position(offset, self.player, slide),
        });
        ctx.text(self.status_text());
    }

    /// Two-line status: difficulty, then floor progress.
    pub fn status_text(&self) -> String {
        format!(
            "Difficulty: {}\n{}F / {}F",
            self.difficulty,
            self.floor_number(),
            self.maze.floor_count()
        )
    }
}
