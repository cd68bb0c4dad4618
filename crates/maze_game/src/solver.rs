//! Breadth-first search over (cell, depth0, depth1).
//!
//! The solver uses the field's own rules: `apply_action` for the action key
//! and `passable` with the current row as context for moves, so any plan it
//! finds can be replayed through the real controller.

use crate::field::{apply_action, slide_frame_count, Direction};
use crate::maze::{Cell, MazeData};
use crate::replay::ReplaySequence;
use maze_core::Key;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Move(Direction),
    Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct State {
    cell: Cell,
    depth0: usize,
    depth1: usize,
}

/// Shortest step plan from the maze's start (layers at 0, 0) to its goal, or
/// `None` if the goal cannot be reached under any layer combination.
pub fn solve(maze: &MazeData) -> Option<Vec<Step>> {
    let start = State {
        cell: maze.start(),
        depth0: 0,
        depth1: 0,
    };
    let mut prev: HashMap<State, Option<(State, Step)>> = HashMap::new();
    let mut queue = VecDeque::new();
    prev.insert(start, None);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if maze.is_goal(current.cell.x, current.cell.y) {
            let mut steps = Vec::new();
            let mut at = current;
            while let Some(Some((before, step))) = prev.get(&at) {
                steps.push(*step);
                at = *before;
            }
            steps.reverse();
            return Some(steps);
        }

        for (next, step) in successors(maze, current) {
            if !prev.contains_key(&next) {
                prev.insert(next, Some((current, step)));
                queue.push_back(next);
            }
        }
    }
    None
}

fn successors(maze: &MazeData, state: State) -> Vec<(State, Step)> {
    let mut out = Vec::with_capacity(5);
    let (depth0, depth1) = apply_action(maze, state.cell, state.depth0, state.depth1);
    if (depth0, depth1) != (state.depth0, state.depth1) {
        out.push((
            State {
                depth0,
                depth1,
                ..state
            },
            Step::Action,
        ));
    }
    for direction in Direction::ALL {
        let next = direction.step(state.cell);
        if maze.passable(next.x, next.y, state.cell.y, state.depth0, state.depth1) {
            out.push((State { cell: next, ..state }, Step::Move(direction)));
        }
    }
    out
}

/// Input frames that carry out `steps` on a field that starts idle. Each move
/// holds its direction for one frame and then waits out the slide; each action
/// taps Space and releases it.
pub fn script_for(steps: &[Step]) -> ReplaySequence {
    let mut replay = ReplaySequence::default();
    for step in steps {
        match step {
            Step::Move(direction) => {
                replay.push(vec![direction.key()], 1);
                replay.push(Vec::new(), slide_frame_count());
            }
            Step::Action => {
                replay.push(vec![Key::Space], 1);
                replay.push(Vec::new(), 1);
            }
        }
    }
    replay
}
