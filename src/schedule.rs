// ESPN scoreboard client: the external schedule provider.
//
// Fetches a week's games (home/away abbreviations and kickoff times) from
// the public ESPN scoreboard endpoint. Fetch failures surface as
// `ScheduleError::Unavailable` so callers can report "schedule unavailable"
// instead of turning missing data into a pick decision.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Public ESPN NFL API root.
pub const ESPN_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports/football/nfl";

/// ESPN season type for the regular season.
const REGULAR_SEASON: u32 = 2;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule unavailable for {season} week {week}: {message}")]
    Unavailable {
        season: i32,
        week: u32,
        message: String,
    },
}

/// One scheduled game in a week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub home: String,
    pub away: String,
    pub start_time: DateTime<Utc>,
}

/// The seam between the engine and whatever supplies schedules. Production
/// uses [`EspnClient`]; tests substitute an in-process mock.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    async fn week_schedule(&self, season: i32, week: u32) -> Result<Vec<Game>, ScheduleError>;
}

/// HTTP client for the ESPN scoreboard endpoint.
pub struct EspnClient {
    http: reqwest::Client,
    base_url: String,
}

impl EspnClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        EspnClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ScheduleProvider for EspnClient {
    async fn week_schedule(&self, season: i32, week: u32) -> Result<Vec<Game>, ScheduleError> {
        let url = format!(
            "{}/scoreboard?limit=1000&seasontype={REGULAR_SEASON}&dates={season}&week={week}",
            self.base_url
        );
        debug!("fetching schedule: {url}");

        let unavailable = |message: String| ScheduleError::Unavailable {
            season,
            week,
            message,
        };

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| unavailable(format!("bad response body: {e}")))?;

        let games = parse_scoreboard(&body);
        debug!("week {week} schedule: {} games", games.len());
        Ok(games)
    }
}

/// Pull (home, away, kickoff) triples out of an ESPN scoreboard payload.
/// Events missing a competitor or a parseable date are skipped with a
/// warning rather than failing the whole week.
pub fn parse_scoreboard(body: &Value) -> Vec<Game> {
    let events = body
        .get("events")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut games = Vec::with_capacity(events.len());
    for event in events {
        match parse_event(event) {
            Some(game) => games.push(game),
            None => warn!("skipping malformed scoreboard event: {event}"),
        }
    }
    games
}

fn parse_event(event: &Value) -> Option<Game> {
    let competitors = event
        .get("competitions")?
        .get(0)?
        .get("competitors")?
        .as_array()?;

    let abbreviation_of = |side: &str| -> Option<String> {
        competitors
            .iter()
            .find(|c| c.get("homeAway").and_then(Value::as_str) == Some(side))?
            .get("team")?
            .get("abbreviation")?
            .as_str()
            .map(str::to_string)
    };

    let home = abbreviation_of("home")?;
    let away = abbreviation_of("away")?;
    let start_time = parse_game_date(event.get("date")?.as_str()?)?;

    Some(Game {
        home,
        away,
        start_time,
    })
}

/// Parse an ESPN event date. The scoreboard emits minute-precision UTC
/// timestamps without seconds ("2025-09-05T00:20Z"); full RFC 3339 is
/// accepted as well.
pub fn parse_game_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| naive.and_utc())
}
