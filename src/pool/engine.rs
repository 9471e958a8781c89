// Per-request pick engine: eligibility validation and commit.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::divisions::DivisionIndex;
use crate::schedule::Game;

use super::facts::{derive_facts, HistoryFacts};
use super::lock;
use super::pick::{Pick, PickHistory, TeamId, Week};

/// Why a candidate pick was refused. Every variant is locally recoverable;
/// callers turn these into user-facing guidance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PickRejection {
    #[error("picks must be made in week order; week {required} needs a pick first")]
    OutOfOrder { required: Week },

    #[error("week {week} is locked: its first game has kicked off")]
    WeekLocked { week: Week },

    #[error("{team} was already picked in another week")]
    TeamAlreadyUsed { team: TeamId },

    #[error("a team from {division} was already picked in the current cycle")]
    DivisionAlreadyUsedThisCycle { division: String },

    #[error("no division on record for team {team}")]
    UnknownTeam { team: TeamId },
}

/// Decides pick eligibility for one player against one week's schedule.
///
/// Constructed per request from the inputs it judges against; it holds no
/// session state and samples no clocks — `now` is supplied by the caller.
pub struct PickEngine<'a> {
    schedule: &'a [Game],
    divisions: &'a DivisionIndex,
    now: DateTime<Utc>,
}

impl<'a> PickEngine<'a> {
    pub fn new(schedule: &'a [Game], divisions: &'a DivisionIndex, now: DateTime<Utc>) -> Self {
        PickEngine {
            schedule,
            divisions,
            now,
        }
    }

    /// The only week a new pick may target: one past the latest picked week.
    pub fn required_week(&self, history: &PickHistory) -> Week {
        self.facts(history, None).next_required_week
    }

    /// Whether `week` is closed to new or changed picks, by kickoff time or
    /// by the sequential rule.
    pub fn is_week_locked(&self, week: Week, history: &PickHistory) -> bool {
        let facts = self.facts(history, None);
        lock::is_locked(week, self.schedule, &facts, self.now)
    }

    /// Apply all eligibility rules to a candidate (week, team).
    ///
    /// Checks run in a fixed order so the caller always sees the most
    /// actionable failure: sequencing, then the time lock, then team reuse,
    /// then the division cycle. A week that already holds a pick may be
    /// re-validated at any position, subject to the time lock; its stored
    /// pick is excluded from the reuse and division checks so a player can
    /// re-confirm or change it.
    pub fn validate_pick(
        &self,
        week: Week,
        team: &str,
        history: &PickHistory,
    ) -> Result<(), PickRejection> {
        let facts = self.facts(history, Some(week));

        if !history.contains_key(&week) && week != facts.next_required_week {
            return Err(PickRejection::OutOfOrder {
                required: facts.next_required_week,
            });
        }

        if lock::time_locked(self.schedule, self.now) {
            return Err(PickRejection::WeekLocked { week });
        }

        if facts.picked_team_set.contains(team) {
            return Err(PickRejection::TeamAlreadyUsed {
                team: team.to_string(),
            });
        }

        let division = self
            .divisions
            .division_of(team)
            .ok_or_else(|| PickRejection::UnknownTeam {
                team: team.to_string(),
            })?;
        if facts.position_in_cycle != 0 && facts.used_divisions_this_cycle.contains(division) {
            return Err(PickRejection::DivisionAlreadyUsedThisCycle {
                division: division.to_string(),
            });
        }

        Ok(())
    }

    /// Apply a validated pick: set `week`'s slot to an ungraded pick for
    /// `team`, overwriting any prior value for that week and touching no
    /// other entry. Returns the new history for the caller to persist.
    pub fn commit_pick(&self, week: Week, team: &str, history: &PickHistory) -> PickHistory {
        let mut updated = history.clone();
        updated.insert(week, Pick::new(team));
        updated
    }

    fn facts(&self, history: &PickHistory, exclude_week: Option<Week>) -> HistoryFacts {
        derive_facts(history, self.divisions, exclude_week)
    }
}
