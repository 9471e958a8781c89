// Survivor pool entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config
// 3. Open the record store, load the division index
// 4. Dispatch the subcommand
//
// Subcommands:
//   survivor week                        print the current (season, week)
//   survivor status <player>             show a player's picks and summary
//   survivor pick <player> <week> <team> validate and submit a pick

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use survivor_pool::app::{self, SubmitOutcome};
use survivor_pool::config;
use survivor_pool::divisions::DivisionIndex;
use survivor_pool::pool::engine::PickRejection;
use survivor_pool::pool::pick::PickResult;
use survivor_pool::schedule::EspnClient;
use survivor_pool::season;
use survivor_pool::store::RecordStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = config::load_config().context("failed to load configuration")?;

    let store = RecordStore::open(&config.db_path).context("failed to open record store")?;
    let divisions = DivisionIndex::from_csv(&config.divisions_path)
        .context("failed to load division index")?;
    info!(
        "Record store at {}, {} teams in division index",
        config.db_path,
        divisions.len()
    );

    let today = Utc::now().date_naive();
    let (derived_season, current_week) = season::current_week(today);
    let season = config.season.unwrap_or(derived_season);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["week"] => {
            println!("Season {season}, week {current_week}");
        }
        ["status", player] => {
            let overview = app::player_overview(&store, &divisions, season, player)?;
            println!(
                "{player} ({}) — season {season}, next required week: {}",
                overview.status.as_str(),
                overview.required_week
            );
            for (week, pick) in &overview.picks {
                let grade = match pick.result {
                    PickResult::Unknown => "-",
                    PickResult::Correct => "won",
                    PickResult::Incorrect => "lost",
                };
                println!("  week {week:>2}: {} {grade}", pick.team);
            }
            println!(
                "  {} wins, streak of {}",
                overview.summary.wins, overview.summary.current_streak
            );
        }
        ["pick", player, week, team] => {
            let week: u32 = week
                .parse()
                .with_context(|| format!("invalid week number `{week}`"))?;
            let espn = EspnClient::new(&config.espn_base_url);
            let outcome = app::submit_pick(
                &store, &espn, &divisions, season, player, week, team, Utc::now(),
            )
            .await?;
            match outcome {
                SubmitOutcome::Committed { .. } => {
                    println!("Pick saved: {team} for week {week}.");
                }
                SubmitOutcome::Rejected(reason) => {
                    println!("{}", rejection_message(&reason));
                    std::process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("usage: survivor week");
            eprintln!("       survivor status <player>");
            eprintln!("       survivor pick <player> <week> <team>");
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Translate a structured rejection into user-facing guidance. The engine
/// never formats messages itself.
fn rejection_message(reason: &PickRejection) -> String {
    match reason {
        PickRejection::OutOfOrder { required } => format!(
            "You must make your picks in order. Make a pick for week {required} first."
        ),
        PickRejection::WeekLocked { week } => format!(
            "Week {week} is locked — its first game has kicked off. Your pick cannot be saved."
        ),
        PickRejection::TeamAlreadyUsed { team } => {
            format!("You have already picked {team} in a previous week.")
        }
        PickRejection::DivisionAlreadyUsedThisCycle { division } => format!(
            "You have already picked a team from the {division} in the current 8-week cycle."
        ),
        PickRejection::UnknownTeam { team } => {
            format!("{team} is not a team this pool knows about.")
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("survivor_pool=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
