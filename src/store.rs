// SQLite persistence for per-(season, player) survivor pool records.
//
// Every row carries a version counter. Writes are conditional on the version
// the caller read (compare-and-swap), so two sessions racing on the same
// record can never silently overwrite each other: the loser gets
// `WriteOutcome::Conflict` and must re-read and re-validate.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::pool::pick::{PickHistory, PlayerSeasonRecord, PlayerStatus};

/// Version token for a record that does not exist yet. Passing this to
/// [`RecordStore::write_if_unchanged`] requests an insert.
pub const NEW_RECORD_VERSION: i64 = 0;

/// A record together with the version token it was read at.
#[derive(Debug, Clone)]
pub struct VersionedRecord {
    pub record: PlayerSeasonRecord,
    pub version: i64,
}

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write landed; `version` is the record's new version token.
    Committed { version: i64 },
    /// The record changed since it was read. The caller must re-fetch and
    /// re-validate before trying again.
    Conflict,
}

/// SQLite-backed store for player season records.
pub struct RecordStore {
    conn: Mutex<Connection>,
}

impl RecordStore {
    /// Open (or create) the store at `path` and ensure the schema exists.
    /// Pass `":memory:"` for an ephemeral database (useful for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open record store at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set record store pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS pool_records (
                season     INTEGER NOT NULL,
                player_id  TEXT NOT NULL,
                status     TEXT NOT NULL,
                picks      TEXT NOT NULL,
                version    INTEGER NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (season, player_id)
            );
            ",
        )
        .context("failed to create record store schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("record store mutex poisoned")
    }

    /// Read the record for (season, player), along with its version token.
    /// Legacy pick shapes (bare team strings) are normalized on the way in.
    pub fn read(&self, season: i32, player_id: &str) -> Result<Option<VersionedRecord>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT status, picks, version FROM pool_records
                 WHERE season = ?1 AND player_id = ?2",
                params![season, player_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()
            .context("failed to read pool record")?;

        let Some((status, picks_json, version)) = row else {
            return Ok(None);
        };

        let picks: PickHistory = serde_json::from_str(&picks_json)
            .with_context(|| format!("corrupt picks column for {player_id} season {season}"))?;

        Ok(Some(VersionedRecord {
            record: PlayerSeasonRecord {
                status: PlayerStatus::from_str_status(&status),
                picks,
            },
            version,
        }))
    }

    /// Write `record` only if the stored version still equals
    /// `expected_version`. Use [`NEW_RECORD_VERSION`] when the read found no
    /// row. Returns `Conflict` when the row was created or changed since the
    /// read; nothing is written in that case.
    pub fn write_if_unchanged(
        &self,
        season: i32,
        player_id: &str,
        expected_version: i64,
        record: &PlayerSeasonRecord,
    ) -> Result<WriteOutcome> {
        let picks_json =
            serde_json::to_string(&record.picks).context("failed to serialize picks")?;
        let conn = self.conn();

        let changed = if expected_version == NEW_RECORD_VERSION {
            conn.execute(
                "INSERT INTO pool_records (season, player_id, status, picks, version)
                 VALUES (?1, ?2, ?3, ?4, 1)
                 ON CONFLICT (season, player_id) DO NOTHING",
                params![season, player_id, record.status.as_str(), picks_json],
            )
            .context("failed to insert pool record")?
        } else {
            conn.execute(
                "UPDATE pool_records
                 SET status = ?4, picks = ?5, version = version + 1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE season = ?1 AND player_id = ?2 AND version = ?3",
                params![
                    season,
                    player_id,
                    expected_version,
                    record.status.as_str(),
                    picks_json
                ],
            )
            .context("failed to update pool record")?
        };

        if changed == 1 {
            Ok(WriteOutcome::Committed {
                version: expected_version + 1,
            })
        } else {
            Ok(WriteOutcome::Conflict)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::pick::{Pick, PickResult};

    const SEASON: i32 = 2025;
    const PLAYER: &str = "uid-1234";

    fn test_store() -> RecordStore {
        RecordStore::open(":memory:").expect("in-memory store should open")
    }

    fn record_with(teams: &[(u32, &str)]) -> PlayerSeasonRecord {
        PlayerSeasonRecord {
            status: PlayerStatus::Active,
            picks: teams
                .iter()
                .map(|(week, team)| (*week, Pick::new(*team)))
                .collect(),
        }
    }

    #[test]
    fn read_missing_record_is_none() {
        let store = test_store();
        assert!(store.read(SEASON, PLAYER).unwrap().is_none());
    }

    #[test]
    fn insert_then_read_roundtrips() {
        let store = test_store();
        let record = record_with(&[(1, "KC"), (2, "BUF")]);

        let outcome = store
            .write_if_unchanged(SEASON, PLAYER, NEW_RECORD_VERSION, &record)
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Committed { version: 1 });

        let read = store.read(SEASON, PLAYER).unwrap().unwrap();
        assert_eq!(read.version, 1);
        assert_eq!(read.record, record);
    }

    #[test]
    fn insert_conflicts_when_row_already_exists() {
        let store = test_store();
        let record = record_with(&[(1, "KC")]);
        store
            .write_if_unchanged(SEASON, PLAYER, NEW_RECORD_VERSION, &record)
            .unwrap();

        // A second session that read "no record" loses the race.
        let outcome = store
            .write_if_unchanged(SEASON, PLAYER, NEW_RECORD_VERSION, &record)
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Conflict);
    }

    #[test]
    fn stale_version_update_conflicts_and_writes_nothing() {
        let store = test_store();
        store
            .write_if_unchanged(SEASON, PLAYER, NEW_RECORD_VERSION, &record_with(&[(1, "KC")]))
            .unwrap();
        store
            .write_if_unchanged(SEASON, PLAYER, 1, &record_with(&[(1, "KC"), (2, "BUF")]))
            .unwrap();

        // Still holding version 1 while the row moved to 2.
        let outcome = store
            .write_if_unchanged(SEASON, PLAYER, 1, &record_with(&[(1, "KC"), (2, "PHI")]))
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Conflict);

        let read = store.read(SEASON, PLAYER).unwrap().unwrap();
        assert_eq!(read.version, 2);
        assert_eq!(read.record.picks[&2].team, "BUF");
    }

    #[test]
    fn version_increments_on_each_write() {
        let store = test_store();
        let mut version = NEW_RECORD_VERSION;
        for week in 1..=3u32 {
            let record = record_with(&[(week, "KC")]);
            match store
                .write_if_unchanged(SEASON, PLAYER, version, &record)
                .unwrap()
            {
                WriteOutcome::Committed { version: v } => version = v,
                WriteOutcome::Conflict => panic!("unexpected conflict at week {week}"),
            }
        }
        assert_eq!(version, 3);
    }

    #[test]
    fn records_are_independent_per_season_and_player() {
        let store = test_store();
        store
            .write_if_unchanged(SEASON, PLAYER, NEW_RECORD_VERSION, &record_with(&[(1, "KC")]))
            .unwrap();
        store
            .write_if_unchanged(SEASON, "uid-other", NEW_RECORD_VERSION, &record_with(&[(1, "DET")]))
            .unwrap();
        store
            .write_if_unchanged(SEASON + 1, PLAYER, NEW_RECORD_VERSION, &record_with(&[(1, "PHI")]))
            .unwrap();

        assert_eq!(
            store.read(SEASON, PLAYER).unwrap().unwrap().record.picks[&1].team,
            "KC"
        );
        assert_eq!(
            store.read(SEASON, "uid-other").unwrap().unwrap().record.picks[&1].team,
            "DET"
        );
        assert_eq!(
            store.read(SEASON + 1, PLAYER).unwrap().unwrap().record.picks[&1].team,
            "PHI"
        );
    }

    #[test]
    fn legacy_bare_string_picks_normalize_on_read() {
        let store = test_store();
        store
            .conn()
            .execute(
                "INSERT INTO pool_records (season, player_id, status, picks, version)
                 VALUES (?1, ?2, 'active', ?3, 1)",
                params![SEASON, PLAYER, r#"{"1": "KC", "2": {"team": "BUF", "result": "correct"}}"#],
            )
            .unwrap();

        let read = store.read(SEASON, PLAYER).unwrap().unwrap();
        assert_eq!(read.record.picks[&1].team, "KC");
        assert_eq!(read.record.picks[&1].result, PickResult::Unknown);
        assert_eq!(read.record.picks[&2].result, PickResult::Correct);
    }

    #[test]
    fn grading_written_by_external_process_is_preserved() {
        let store = test_store();
        let mut record = record_with(&[(1, "KC")]);
        record.picks.get_mut(&1).unwrap().result = PickResult::Incorrect;
        record.status = PlayerStatus::Eliminated;

        store
            .write_if_unchanged(SEASON, PLAYER, NEW_RECORD_VERSION, &record)
            .unwrap();
        let read = store.read(SEASON, PLAYER).unwrap().unwrap();
        assert_eq!(read.record.status, PlayerStatus::Eliminated);
        assert_eq!(read.record.picks[&1].result, PickResult::Incorrect);
    }
}
