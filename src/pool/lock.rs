// Week locking rules: kickoff time and pick sequencing.
//
// Locking gates pick submission and forward navigation only; viewing an
// already-played week is always allowed.

use chrono::{DateTime, Utc};

use crate::schedule::Game;

use super::facts::HistoryFacts;
use super::pick::Week;

/// The earliest scheduled kickoff among a week's games, if any.
pub fn earliest_kickoff(games: &[Game]) -> Option<DateTime<Utc>> {
    games.iter().map(|g| g.start_time).min()
}

/// Whether the week is frozen by game time: `now` is at or past the earliest
/// kickoff. A week with no scheduled games is never time-locked.
pub fn time_locked(games: &[Game], now: DateTime<Utc>) -> bool {
    earliest_kickoff(games).is_some_and(|kickoff| now >= kickoff)
}

/// Whether the week is ahead of the player's required next pick.
pub fn sequentially_locked(week: Week, facts: &HistoryFacts) -> bool {
    week > facts.next_required_week
}

/// Combined lock state for submitting or changing a pick.
pub fn is_locked(week: Week, games: &[Game], facts: &HistoryFacts, now: DateTime<Utc>) -> bool {
    time_locked(games, now) || sequentially_locked(week, facts)
}
