// Pick records and per-season player state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Team abbreviation as used by the schedule and division data (e.g. "KC").
pub type TeamId = String;

/// Week number within a season (1-based).
pub type Week = u32;

/// Grading state of a made pick.
///
/// Set by an external grading process after games finish. The engine only
/// ever writes `Unknown` and preserves whatever value it reads back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickResult {
    Unknown,
    Correct,
    Incorrect,
}

/// A made pick for one week. An absent week entry in [`PickHistory`] is the
/// "unmade" state; there is at most one pick per week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pick {
    pub team: TeamId,
    pub result: PickResult,
}

impl Pick {
    /// A freshly committed, not-yet-graded pick.
    pub fn new(team: impl Into<TeamId>) -> Self {
        Pick {
            team: team.into(),
            result: PickResult::Unknown,
        }
    }
}

/// Raw stored shape of a pick. Early records stored a bare team string;
/// current records store a `{team, result}` object. Normalized into [`Pick`]
/// at the storage boundary so nothing downstream branches on runtime shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPick {
    Full {
        team: TeamId,
        #[serde(default)]
        result: Option<PickResult>,
    },
    Bare(TeamId),
}

impl<'de> Deserialize<'de> for Pick {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match RawPick::deserialize(deserializer)? {
            RawPick::Full { team, result } => Ok(Pick {
                team,
                result: result.unwrap_or(PickResult::Unknown),
            }),
            RawPick::Bare(team) => Ok(Pick {
                team,
                result: PickResult::Unknown,
            }),
        }
    }
}

/// All picks for one player in one season, keyed by week number.
pub type PickHistory = BTreeMap<Week, Pick>;

/// Whether the player still holds a perfect record. Maintained by the
/// external grading process; advisory only — it never blocks a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    #[default]
    Active,
    Eliminated,
}

impl PlayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "active",
            PlayerStatus::Eliminated => "eliminated",
        }
    }

    /// Parse a stored status string. Unrecognized values fall back to
    /// `Active` so a bad row can't strand a player.
    pub fn from_str_status(s: &str) -> Self {
        match s {
            "eliminated" => PlayerStatus::Eliminated,
            _ => PlayerStatus::Active,
        }
    }
}

/// The persisted record for one (season, player) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlayerSeasonRecord {
    #[serde(default)]
    pub status: PlayerStatus,
    #[serde(default)]
    pub picks: PickHistory,
}

/// Graded results rolled up for leaderboard-style reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeasonSummary {
    /// Total picks graded correct.
    pub wins: u32,
    /// Consecutive correct picks counting back from the most recent graded
    /// week. Ungraded picks are skipped; an incorrect pick ends the streak.
    pub current_streak: u32,
}

/// Compute wins and current streak from a pick history.
pub fn season_summary(history: &PickHistory) -> SeasonSummary {
    let wins = history
        .values()
        .filter(|p| p.result == PickResult::Correct)
        .count() as u32;

    let mut current_streak = 0;
    for pick in history.values().rev() {
        match pick.result {
            PickResult::Correct => current_streak += 1,
            PickResult::Unknown => continue,
            PickResult::Incorrect => break,
        }
    }

    SeasonSummary {
        wins,
        current_streak,
    }
}
