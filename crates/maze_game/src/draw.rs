//! Draw output of the simulation.
//!
//! The core never touches GPU handles. Each frame the renderer hands in a
//! `DrawContext` that knows the screen size, and the field pushes plain
//! commands into it: where the maze sits, where the player sprite goes, and
//! the status text. Pixel space has y pointing down, so grid rows are flipped
//! around the camera anchor.

use crate::maze::{Cell, MazeData, TileAppearance, TILE_SIZE};
use glam::{IVec2, UVec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteId {
    Player,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    /// Draw the maze with cell (0, 0) anchored at `offset` under the given layers.
    Maze {
        offset: IVec2,
        depth0: usize,
        depth1: usize,
    },
    Sprite {
        sprite: SpriteId,
        position: IVec2,
    },
    Text {
        text: String,
        position: IVec2,
    },
}

#[derive(Debug, Clone)]
pub struct DrawContext {
    pub screen: UVec2,
    pub commands: Vec<DrawCommand>,
}

impl DrawContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            screen: UVec2::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.push(DrawCommand::Text {
            text: text.into(),
            position: IVec2::ZERO,
        });
    }

    /// Drop last frame's commands. The renderer calls this before each draw.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

/// Player position in pixels, slide offset included, y up.
pub fn player_pixels(player: Cell, slide: (i32, i32)) -> IVec2 {
    IVec2::new(player.x * TILE_SIZE + slide.0, player.y * TILE_SIZE + slide.1)
}

/// Where maze cell (0, 0)'s baseline lands on screen so that the player is
/// centred horizontally and sits at two thirds of the screen height.
pub fn camera_offset(screen: UVec2, player: Cell, slide: (i32, i32)) -> IVec2 {
    let anchor = IVec2::new(screen.x as i32 / 2, screen.y as i32 / 3 * 2);
    let world = player_pixels(player, slide);
    IVec2::new(anchor.x - world.x, anchor.y + world.y)
}

/// Top-left screen corner of `cell` for a maze drawn at `offset`.
pub fn tile_screen_position(offset: IVec2, cell: Cell) -> IVec2 {
    IVec2::new(offset.x + cell.x * TILE_SIZE, offset.y - (cell.y + 1) * TILE_SIZE)
}

/// Top-left screen corner of the player sprite.
pub fn player_screen_position(offset: IVec2, player: Cell, slide: (i32, i32)) -> IVec2 {
    let world = player_pixels(player, slide);
    IVec2::new(world.x, -(world.y + TILE_SIZE)) + offset
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleTile {
    pub cell: Cell,
    pub position: IVec2,
    pub appearance: TileAppearance,
}

/// Every maze tile that overlaps the screen, bottom row first.
pub fn visible_tiles(
    maze: &MazeData,
    offset: IVec2,
    screen: UVec2,
    depth0: usize,
    depth1: usize,
) -> Vec<VisibleTile> {
    let screen = screen.as_ivec2();
    let mut tiles = Vec::new();
    for y in 0..maze.height() {
        for x in 0..maze.width() {
            let cell = Cell::new(x, y);
            let position = tile_screen_position(offset, cell);
            let overlaps = position.x < screen.x
                && position.y < screen.y
                && position.x + TILE_SIZE > 0
                && position.y + TILE_SIZE > 0;
            if overlaps {
                tiles.push(VisibleTile {
                    cell,
                    position,
                    appearance: maze.appearance(x, y, depth0, depth1),
                });
            }
        }
    }
    tiles
}
