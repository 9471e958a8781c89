// Derived facts about a pick history, recomputed on every query.

use std::collections::BTreeSet;

use crate::divisions::DivisionIndex;

use super::pick::{PickHistory, TeamId, Week};

/// How many picks make up one division cycle: within a running block of
/// this many picks, a player may not pick two teams from the same division.
pub const CYCLE_LENGTH: usize = 8;

/// Everything the lock evaluator and validator need to know about a
/// player's history, derived fresh from the stored picks.
#[derive(Debug, Clone)]
pub struct HistoryFacts {
    /// Made picks as (week, team), ascending by week.
    pub ordered_picks: Vec<(Week, TeamId)>,
    /// Highest week with a made pick, or 0 if none.
    pub latest_picked_week: Week,
    /// The only week a new (not-yet-picked) pick may target.
    pub next_required_week: Week,
    /// Count of made picks.
    pub total_pick_count: usize,
    /// Zero-based index of the current division cycle.
    pub cycle_index: usize,
    /// Position within the current cycle; 0 means a fresh cycle.
    pub position_in_cycle: usize,
    /// Divisions used by the picks of the current, not-yet-complete cycle.
    pub used_divisions_this_cycle: BTreeSet<String>,
    /// Teams used anywhere in the history.
    pub picked_team_set: BTreeSet<TeamId>,
}

/// Derive [`HistoryFacts`] from a pick history.
///
/// `exclude_week` supports re-validating or replacing the pick already
/// stored for that week: the excluded week's team is dropped from
/// `picked_team_set` and its division from `used_divisions_this_cycle`, so a
/// player can re-confirm or change their own pick. Sequencing facts
/// (`latest_picked_week`, counts, cycle arithmetic) always see the full
/// history — the slot still exists, only its contents are up for replacement.
pub fn derive_facts(
    history: &PickHistory,
    divisions: &DivisionIndex,
    exclude_week: Option<Week>,
) -> HistoryFacts {
    // BTreeMap iteration is already ascending by week.
    let ordered_picks: Vec<(Week, TeamId)> = history
        .iter()
        .map(|(week, pick)| (*week, pick.team.clone()))
        .collect();

    let latest_picked_week = ordered_picks.last().map(|(week, _)| *week).unwrap_or(0);
    let next_required_week = latest_picked_week + 1;

    let total_pick_count = ordered_picks.len();
    let cycle_index = total_pick_count / CYCLE_LENGTH;
    let position_in_cycle = total_pick_count % CYCLE_LENGTH;

    let picked_team_set: BTreeSet<TeamId> = ordered_picks
        .iter()
        .filter(|(week, _)| exclude_week != Some(*week))
        .map(|(_, team)| team.clone())
        .collect();

    // A fresh cycle (position 0) starts with no used divisions, whether the
    // history is empty or the count is a nonzero multiple of the cycle
    // length. Cycles are strictly disjoint.
    let used_divisions_this_cycle: BTreeSet<String> = if position_in_cycle == 0 {
        BTreeSet::new()
    } else {
        let cycle_start = total_pick_count - position_in_cycle;
        ordered_picks[cycle_start..]
            .iter()
            .filter(|(week, _)| exclude_week != Some(*week))
            .filter_map(|(_, team)| divisions.division_of(team))
            .map(str::to_string)
            .collect()
    };

    HistoryFacts {
        ordered_picks,
        latest_picked_week,
        next_required_week,
        total_pick_count,
        cycle_index,
        position_in_cycle,
        used_divisions_this_cycle,
        picked_team_set,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::pick::Pick;

    fn index() -> DivisionIndex {
        DivisionIndex::from_pairs([
            ("KC", "AFC West"),
            ("LAC", "AFC West"),
            ("BUF", "AFC East"),
            ("BAL", "AFC North"),
            ("HOU", "AFC South"),
            ("PHI", "NFC East"),
            ("DET", "NFC North"),
            ("TB", "NFC South"),
            ("SF", "NFC West"),
            ("SEA", "NFC West"),
        ])
    }

    fn history(teams: &[&str]) -> PickHistory {
        teams
            .iter()
            .enumerate()
            .map(|(i, team)| (i as Week + 1, Pick::new(*team)))
            .collect()
    }

    #[test]
    fn empty_history_yields_week_one() {
        let facts = derive_facts(&PickHistory::new(), &index(), None);
        assert_eq!(facts.latest_picked_week, 0);
        assert_eq!(facts.next_required_week, 1);
        assert_eq!(facts.total_pick_count, 0);
        assert_eq!(facts.cycle_index, 0);
        assert_eq!(facts.position_in_cycle, 0);
        assert!(facts.used_divisions_this_cycle.is_empty());
        assert!(facts.picked_team_set.is_empty());
    }

    #[test]
    fn next_required_week_follows_latest_pick() {
        let facts = derive_facts(&history(&["KC", "BUF", "PHI"]), &index(), None);
        assert_eq!(facts.latest_picked_week, 3);
        assert_eq!(facts.next_required_week, 4);
        assert_eq!(facts.total_pick_count, 3);
        assert_eq!(facts.position_in_cycle, 3);
    }

    #[test]
    fn ordered_picks_ascend_even_with_sparse_weeks() {
        let mut h = PickHistory::new();
        h.insert(3, Pick::new("PHI"));
        h.insert(1, Pick::new("KC"));
        let facts = derive_facts(&h, &index(), None);
        assert_eq!(
            facts.ordered_picks,
            vec![(1, "KC".to_string()), (3, "PHI".to_string())]
        );
        assert_eq!(facts.latest_picked_week, 3);
    }

    #[test]
    fn used_divisions_cover_only_current_cycle() {
        let facts = derive_facts(&history(&["KC", "BUF"]), &index(), None);
        assert_eq!(facts.cycle_index, 0);
        assert_eq!(facts.position_in_cycle, 2);
        assert!(facts.used_divisions_this_cycle.contains("AFC West"));
        assert!(facts.used_divisions_this_cycle.contains("AFC East"));
    }

    #[test]
    fn cycle_boundary_resets_divisions() {
        // Exactly one full cycle of 8: position 0, fresh used-set.
        let teams = ["KC", "BUF", "BAL", "HOU", "PHI", "DET", "TB", "SF"];
        let facts = derive_facts(&history(&teams), &index(), None);
        assert_eq!(facts.total_pick_count, 8);
        assert_eq!(facts.cycle_index, 1);
        assert_eq!(facts.position_in_cycle, 0);
        assert!(facts.used_divisions_this_cycle.is_empty());
        // Teams stay globally used across the boundary.
        assert!(facts.picked_team_set.contains("KC"));
    }

    #[test]
    fn second_cycle_tracks_only_its_own_picks() {
        let teams = ["KC", "BUF", "BAL", "HOU", "PHI", "DET", "TB", "SF", "SEA"];
        let facts = derive_facts(&history(&teams), &index(), None);
        assert_eq!(facts.cycle_index, 1);
        assert_eq!(facts.position_in_cycle, 1);
        assert_eq!(
            facts.used_divisions_this_cycle.iter().collect::<Vec<_>>(),
            vec!["NFC West"]
        );
    }

    #[test]
    fn exclude_week_drops_team_and_division() {
        let facts = derive_facts(&history(&["KC", "BUF"]), &index(), Some(2));
        // Week 2 (BUF) is up for replacement: its team and division vanish,
        // but the slot still counts for sequencing and cycle position.
        assert!(!facts.picked_team_set.contains("BUF"));
        assert!(facts.picked_team_set.contains("KC"));
        assert!(!facts.used_divisions_this_cycle.contains("AFC East"));
        assert!(facts.used_divisions_this_cycle.contains("AFC West"));
        assert_eq!(facts.next_required_week, 3);
        assert_eq!(facts.position_in_cycle, 2);
    }

    #[test]
    fn exclude_week_with_no_stored_pick_changes_nothing() {
        let with = derive_facts(&history(&["KC"]), &index(), Some(5));
        let without = derive_facts(&history(&["KC"]), &index(), None);
        assert_eq!(with.picked_team_set, without.picked_team_set);
        assert_eq!(
            with.used_divisions_this_cycle,
            without.used_divisions_this_cycle
        );
    }

    #[test]
    fn team_missing_from_index_contributes_no_division() {
        let facts = derive_facts(&history(&["KC", "XYZ"]), &index(), None);
        assert_eq!(facts.used_divisions_this_cycle.len(), 1);
        assert!(facts.picked_team_set.contains("XYZ"));
    }
}
