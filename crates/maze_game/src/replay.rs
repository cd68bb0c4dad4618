//! Recorded input: one entry per frame listing the keys physically held.
//!
//! Replays store held keys only. Edges are derived when the frames are
//! played back into an `InputState`, so a key that stays down across two
//! frames is "just pressed" on the first one only, exactly like live input.

use crate::field::FieldInput;
use maze_core::{InputState, Key};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ReplayFrame {
    #[serde(default)]
    pub held: Vec<Key>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// Append `repeat` frames holding `held`, folding into the previous entry
    /// when it holds the same keys.
    pub fn push(&mut self, held: Vec<Key>, repeat: u32) {
        if let Some(last) = self.frames.last_mut() {
            if last.held == held {
                last.repeat += repeat;
                return;
            }
        }
        self.frames.push(ReplayFrame { held, repeat });
    }

    pub fn frame_count(&self) -> usize {
        self.frames.iter().map(|f| f.repeat.max(1) as usize).sum()
    }

    pub fn expanded_frames(&self) -> Vec<Vec<Key>> {
        let mut out = Vec::with_capacity(self.frame_count());
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(frame.held.clone());
            }
        }
        out
    }

    /// Field snapshots for every frame, as the game scene would see them.
    pub fn field_inputs(&self) -> Vec<FieldInput> {
        let mut input = InputState::new();
        let mut player = ReplayPlayer::new(self);
        let mut out = Vec::with_capacity(self.frame_count());
        while player.apply_next(&mut input) {
            out.push(FieldInput::from_state(&input));
            input.end_frame();
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

pub fn save_replay_to_path(path: &Path, replay: &ReplaySequence) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(replay)
        .map_err(|e| format!("Failed to encode replay: {e}"))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}

/// Feeds a replay into an `InputState` one frame at a time.
pub struct ReplayPlayer {
    frames: Vec<Vec<Key>>,
    cursor: usize,
}

impl ReplayPlayer {
    pub fn new(replay: &ReplaySequence) -> Self {
        Self {
            frames: replay.expanded_frames(),
            cursor: 0,
        }
    }

    /// Press and release keys so `input` holds exactly the next frame's keys.
    /// Returns false once the replay is exhausted. The caller still owns
    /// `end_frame()`.
    pub fn apply_next(&mut self, input: &mut InputState) -> bool {
        let Some(frame) = self.frames.get(self.cursor) else {
            return false;
        };
        for key in input.held_keys() {
            if !frame.contains(&key) {
                input.key_up(key);
            }
        }
        for key in frame {
            input.key_down(*key);
        }
        self.cursor += 1;
        true
    }

    pub fn remaining(&self) -> usize {
        self.frames.len() - self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldController;
    use crate::maze::tests::sample_maze;
    use crate::maze::Cell;
    use maze_core::Difficulty;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "maze_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    /// Solves the sample maze: two presses on the start cell, then walk.
    const SAMPLE_SOLUTION: &str = r#"{
      "frames": [
        { "held": ["Space"] },
        { "held": [] },
        { "held": ["Enter"] },
        { "held": ["ArrowRight"], "repeat": 10 },
        { "held": ["W"], "repeat": 20 },
        { "held": ["A"], "repeat": 10 },
        { "held": ["ArrowUp", "ArrowRight"], "repeat": 10 }
      ]
    }"#;

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "held": ["ArrowUp"], "repeat": 3 },
                { "held": ["Space"], "repeat": 0 },
                { }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_frames();
        assert_eq!(expanded.len(), 5);
        assert_eq!(replay.frame_count(), 5);
        assert_eq!(expanded[2], vec![Key::ArrowUp]);
        assert_eq!(expanded[3], vec![Key::Space]);
        assert!(expanded[4].is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay should fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let path = temp_file_path("bad_key");
        fs::write(&path, r#"{ "frames": [ { "held": ["Tab"] } ] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("unknown key should fail");
        assert!(err.contains("Failed to parse replay JSON"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn push_folds_identical_frames() {
        let mut replay = ReplaySequence::default();
        replay.push(vec![Key::ArrowUp], 1);
        replay.push(vec![Key::ArrowUp], 4);
        replay.push(vec![], 2);
        assert_eq!(replay.frames.len(), 2);
        assert_eq!(replay.frames[0].repeat, 5);
        assert_eq!(replay.frame_count(), 7);
    }

    #[test]
    fn held_key_is_just_pressed_once() {
        let mut replay = ReplaySequence::default();
        replay.push(vec![Key::Space], 3);
        replay.push(vec![], 1);
        replay.push(vec![Key::Space], 1);
        let inputs = replay.field_inputs();
        let actions: Vec<bool> = inputs.iter().map(|i| i.action).collect();
        assert_eq!(actions, vec![true, false, false, false, true]);
    }

    #[test]
    fn player_releases_keys_missing_from_next_frame() {
        let mut replay = ReplaySequence::default();
        replay.push(vec![Key::ArrowLeft, Key::Space], 1);
        replay.push(vec![Key::ArrowLeft], 1);
        let mut player = ReplayPlayer::new(&replay);
        let mut input = InputState::new();

        assert!(player.apply_next(&mut input));
        input.end_frame();
        assert!(player.apply_next(&mut input));
        assert!(input.is_held(Key::ArrowLeft));
        assert!(!input.is_held(Key::Space));
        assert!(input.is_just_released(Key::Space));
        assert_eq!(player.remaining(), 0);
        assert!(!player.apply_next(&mut input));
    }

    #[test]
    fn replay_run_reaches_goal_and_is_deterministic() {
        let replay: ReplaySequence =
            serde_json::from_str(SAMPLE_SOLUTION).expect("sample replay parses");
        let inputs = replay.field_inputs();

        let run = || {
            let mut field = FieldController::with_maze(Difficulty::Normal, sample_maze());
            let trace: Vec<_> = inputs
                .iter()
                .map(|input| {
                    field.update(input);
                    (field.player(), field.offset(), field.depth0(), field.depth1())
                })
                .collect();
            (field, trace)
        };
        let (run_a, trace_a) = run();
        let (run_b, trace_b) = run();

        assert_eq!(trace_a, trace_b);
        assert!(run_a.is_goal_reached());
        assert_eq!(run_a.player(), Cell::new(1, 7));
        assert_eq!(run_a.player(), run_b.player());
    }

    #[test]
    fn save_then_load_keeps_frames() {
        let path = temp_file_path("save");
        let mut replay = ReplaySequence::default();
        replay.push(vec![Key::D], 2);
        replay.push(vec![Key::Enter], 1);
        save_replay_to_path(&path, &replay).expect("save replay");
        let loaded = load_replay_from_path(&path).expect("load replay");
        assert_eq!(loaded, replay);
        let _ = fs::remove_file(path);
    }
}
