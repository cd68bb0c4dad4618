pub mod config;
pub mod draw;
pub mod field;
pub mod generator;
pub mod maze;
pub mod replay;
pub mod scene;
pub mod solver;
