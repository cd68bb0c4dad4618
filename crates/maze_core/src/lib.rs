pub mod difficulty;
pub mod input;

pub use difficulty::Difficulty;
pub use input::{InputState, Key};
