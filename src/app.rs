// Orchestration: the read -> validate -> commit -> conditional-write flow.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::divisions::DivisionIndex;
use crate::pool::engine::{PickEngine, PickRejection};
use crate::pool::pick::{
    season_summary, Pick, PlayerSeasonRecord, PlayerStatus, SeasonSummary, Week,
};
use crate::schedule::ScheduleProvider;
use crate::store::{RecordStore, WriteOutcome, NEW_RECORD_VERSION};

/// How many times a lost write race is retried with freshly read data
/// before giving up. Each attempt re-reads and re-validates; stale data is
/// never resubmitted.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Result of a pick submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The pick was validated and persisted.
    Committed {
        record: PlayerSeasonRecord,
        version: i64,
    },
    /// The pick failed an eligibility rule; nothing was written.
    Rejected(PickRejection),
}

/// Validate and persist a pick for one (season, player).
///
/// The week's schedule is fetched once up front; the record is then read,
/// validated, and written back conditionally on the version it was read at.
/// Losing the write race re-reads the record and re-validates from scratch,
/// so a pick that became illegal under the concurrent change is rejected
/// rather than written.
pub async fn submit_pick(
    store: &RecordStore,
    provider: &dyn ScheduleProvider,
    divisions: &DivisionIndex,
    season: i32,
    player_id: &str,
    week: Week,
    team: &str,
    now: DateTime<Utc>,
) -> Result<SubmitOutcome> {
    let schedule = provider.week_schedule(season, week).await?;

    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let (record, version) = match store.read(season, player_id)? {
            Some(versioned) => (versioned.record, versioned.version),
            None => (PlayerSeasonRecord::default(), NEW_RECORD_VERSION),
        };

        let engine = PickEngine::new(&schedule, divisions, now);
        if let Err(reason) = engine.validate_pick(week, team, &record.picks) {
            info!("pick rejected for {player_id} week {week}: {reason}");
            return Ok(SubmitOutcome::Rejected(reason));
        }

        if record.status == PlayerStatus::Eliminated {
            // Advisory only: an eliminated player plays on.
            info!("{player_id} no longer has a perfect record but is still playing");
        }

        let updated = PlayerSeasonRecord {
            status: record.status,
            picks: engine.commit_pick(week, team, &record.picks),
        };

        match store.write_if_unchanged(season, player_id, version, &updated)? {
            WriteOutcome::Committed { version } => {
                info!("committed {team} for {player_id} season {season} week {week} (v{version})");
                return Ok(SubmitOutcome::Committed {
                    record: updated,
                    version,
                });
            }
            WriteOutcome::Conflict => {
                warn!(
                    "record for {player_id} changed under us (attempt {attempt}/{MAX_WRITE_ATTEMPTS}); re-reading"
                );
            }
        }
    }

    bail!("gave up after {MAX_WRITE_ATTEMPTS} conflicting writes for {player_id} week {week}")
}

/// Read-side view of a player's season: pick sequence, required week, and
/// graded results rolled up.
#[derive(Debug)]
pub struct PlayerOverview {
    pub status: PlayerStatus,
    pub required_week: Week,
    pub picks: Vec<(Week, Pick)>,
    pub summary: SeasonSummary,
}

pub fn player_overview(
    store: &RecordStore,
    divisions: &DivisionIndex,
    season: i32,
    player_id: &str,
) -> Result<PlayerOverview> {
    let record = store
        .read(season, player_id)?
        .map(|versioned| versioned.record)
        .unwrap_or_default();

    // No schedule needed on the read path; the engine only consults it for
    // the time lock.
    let engine = PickEngine::new(&[], divisions, Utc::now());
    let required_week = engine.required_week(&record.picks);
    let summary = season_summary(&record.picks);

    Ok(PlayerOverview {
        status: record.status,
        required_week,
        picks: record.picks.into_iter().collect(),
        summary,
    })
}
