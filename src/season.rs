// Calendar mapping from a date to the current NFL (season, week).

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Regular-season length; week numbers are capped here.
pub const REGULAR_SEASON_WEEKS: u32 = 18;

/// Regular season plus postseason, used to decide whether a date early in
/// the calendar year still belongs to the previous season.
const FULL_SEASON_WEEKS: i64 = 22;

/// The season kicks off on the first Thursday of September.
pub fn season_start(year: i32) -> NaiveDate {
    let september_first =
        NaiveDate::from_ymd_opt(year, 9, 1).expect("September 1st is a valid date");
    let offset = (Weekday::Thu.num_days_from_monday() + 7
        - september_first.weekday().num_days_from_monday())
        % 7;
    september_first + Duration::days(i64::from(offset))
}

/// The (season year, week number) a given date falls in.
///
/// Dates before this year's kickoff count against the previous season if
/// they fall within its 22-week span (January playoffs); otherwise the
/// offseason defaults to week 1 of the upcoming season.
pub fn current_week(today: NaiveDate) -> (i32, u32) {
    let year = today.year();
    let start = season_start(year);

    if today < start {
        let last_start = season_start(year - 1);
        let days_since = (today - last_start).num_days();
        if (0..FULL_SEASON_WEEKS * 7).contains(&days_since) {
            let week = (days_since / 7 + 1) as u32;
            return (year - 1, week.min(REGULAR_SEASON_WEEKS));
        }
        return (year, 1);
    }

    let days_since = (today - start).num_days();
    let week = (days_since / 7 + 1) as u32;
    (year, week.min(REGULAR_SEASON_WEEKS))
}
