use crate::draw::DrawContext;
use crate::field::{FieldController, FieldInput};
use crate::generator;
use crate::maze::MazeData;
use maze_core::{Difficulty, InputState};

pub const TITLE_TEXT: &str = "Layered Maze\nPress any key";

/// How each new session builds its maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub difficulty: Difficulty,
    /// Overrides the difficulty's built-in seed when set.
    pub seed: Option<u64>,
}

impl SessionSettings {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            seed: None,
        }
    }

    pub fn start_field(&self) -> FieldController {
        match self.seed {
            Some(seed) => FieldController::with_maze(
                self.difficulty,
                generator::generate_with_seed(self.difficulty, seed),
            ),
            None => FieldController::new(self.difficulty),
        }
    }
}

#[derive(Debug, Clone)]
enum Scene {
    Title,
    Game(Box<FieldController>),
}

/// Owns the active scene and switches between title and game.
pub struct SceneManager {
    settings: SessionSettings,
    /// Hand-authored maze replacing generation for every session.
    custom_maze: Option<MazeData>,
    scene: Scene,
    clears: u32,
    frame: u64,
}

impl SceneManager {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            custom_maze: None,
            scene: Scene::Title,
            clears: 0,
            frame: 0,
        }
    }

    pub fn with_custom_maze(mut self, maze: MazeData) -> Self {
        self.custom_maze = Some(maze);
        self
    }

    /// The field a new session would start with.
    pub fn start_field(&self) -> FieldController {
        match &self.custom_maze {
            Some(maze) => FieldController::with_maze(self.settings.difficulty, maze.clone()),
            None => self.settings.start_field(),
        }
    }

    pub fn update(&mut self, input: &InputState) {
        self.frame += 1;
        let next = match &mut self.scene {
            Scene::Title => {
                if !input.has_any_just_pressed() {
                    return;
                }
                let field = self.start_field();
                log::info!(
                    "Frame {}: starting {} maze '{}'",
                    self.frame,
                    self.settings.difficulty,
                    field.maze().maze_id
                );
                Scene::Game(Box::new(field))
            }
            Scene::Game(field) => {
                field.update(&FieldInput::from_state(input));
                if !field.is_goal_reached() {
                    return;
                }
                self.clears += 1;
                log::info!(
                    "Frame {}: maze '{}' cleared, back to title",
                    self.frame,
                    field.maze().maze_id
                );
                Scene::Title
            }
        };
        self.scene = next;
    }

    pub fn draw(&self, ctx: &mut DrawContext) {
        match &self.scene {
            Scene::Title => ctx.text(TITLE_TEXT),
            Scene::Game(field) => field.draw(ctx),
        }
    }

    pub fn field(&self) -> Option<&FieldController> {
        match &self.scene {
            Scene::Game(field) => Some(field.as_ref()),
            Scene::Title => None,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self.scene, Scene::Title)
    }

    /// Sessions that reached their goal.
    pub fn clears(&self) -> u32 {
        self.clears
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::DrawCommand;
    use crate::solver;
    use maze_core::Key;

    fn press(manager: &mut SceneManager, input: &mut InputState, key: Key) {
        input.key_down(key);
        manager.update(input);
        input.end_frame();
        input.key_up(key);
        manager.update(input);
        input.end_frame();
    }

    #[test]
    fn title_waits_for_a_key() {
        let mut manager = SceneManager::new(SessionSettings::new(Difficulty::Easy));
        let mut input = InputState::new();
        for _ in 0..10 {
            manager.update(&input);
            input.end_frame();
        }
        assert!(manager.is_title());

        let mut ctx = DrawContext::new(640, 480);
        manager.draw(&mut ctx);
        assert_eq!(
            ctx.commands,
            vec![DrawCommand::Text {
                text: TITLE_TEXT.to_string(),
                position: glam::IVec2::ZERO,
            }]
        );
    }

    #[test]
    fn any_key_starts_the_game() {
        let mut manager = SceneManager::new(SessionSettings::new(Difficulty::Easy));
        let mut input = InputState::new();
        press(&mut manager, &mut input, Key::Escape);
        let field = manager.field().expect("game scene after a key press");
        assert_eq!(field.difficulty(), Difficulty::Easy);
        assert_eq!(field.player(), field.maze().start());
    }

    #[test]
    fn held_key_from_title_does_not_restart() {
        let mut manager = SceneManager::new(SessionSettings::new(Difficulty::Easy));
        let mut input = InputState::new();
        input.key_down(Key::Space);
        manager.update(&input);
        input.end_frame();
        // Space is still held but no longer "just pressed": the game keeps going.
        for _ in 0..5 {
            manager.update(&input);
            input.end_frame();
        }
        assert!(!manager.is_title());
    }

    #[test]
    fn seed_override_is_used() {
        let settings = SessionSettings {
            difficulty: Difficulty::Normal,
            seed: Some(99),
        };
        let field = settings.start_field();
        assert_eq!(field.maze().maze_id, "normal-63");
    }

    #[test]
    fn custom_maze_replaces_generation() {
        let manager = SceneManager::new(SessionSettings::new(Difficulty::Hard))
            .with_custom_maze(crate::maze::tests::sample_maze());
        let field = manager.start_field();
        assert_eq!(field.maze().maze_id, "sample");
        assert_eq!(field.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn clearing_the_maze_returns_to_title() {
        let settings = SessionSettings::new(Difficulty::Easy);
        let mut manager = SceneManager::new(settings);
        let mut input = InputState::new();
        press(&mut manager, &mut input, Key::Enter);
        assert!(!manager.is_title());

        let maze = settings.start_field().maze().clone();
        let steps = solver::solve(&maze).expect("generated mazes are solvable");
        let replay = solver::script_for(&steps);
        let mut player = crate::replay::ReplayPlayer::new(&replay);
        while player.apply_next(&mut input) {
            manager.update(&input);
            input.end_frame();
            if manager.is_title() {
                break;
            }
        }
        assert!(manager.is_title());
        assert_eq!(manager.clears(), 1);
    }
}
