use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Difficulty selects maze size, floor count and how many layer variants the
/// switches and doors cycle through.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// All difficulties, easiest first.
    pub const ALL: &'static [Difficulty] =
        &[Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Human-readable label for the status line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Normal => "Normal",
            Self::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            other => Err(format!("Unknown difficulty '{other}' (expected easy, normal or hard)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(Difficulty::default(), Difficulty::Normal);
    }

    #[test]
    fn display_matches_label() {
        for &difficulty in Difficulty::ALL {
            assert_eq!(format!("{}", difficulty), difficulty.label());
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!("easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        let err = "brutal".parse::<Difficulty>().expect_err("unknown name should fail");
        assert!(err.contains("brutal"));
    }

    #[test]
    fn deserializes_lowercase_names() {
        let difficulty: Difficulty = serde_json::from_str("\"hard\"").expect("valid difficulty");
        assert_eq!(difficulty, Difficulty::Hard);
    }
}
