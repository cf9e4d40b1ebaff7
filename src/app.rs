//! The update pipeline: resolve, read, fetch, substitute, write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::{ClubStats, NhlApi, Standing, TeamSummary};
use crate::config::AppConfig;
use crate::errors::GdtError;
use crate::header;
use crate::lineups::{self, LineCombinations};
use crate::net::{Fetcher, Source};
use crate::render::TeamView;
use crate::schedule::{self, GameDay};
use crate::snapshot::TeamSnapshot;
use crate::teams::{self, TeamIdentity};
use crate::template::{self, SubstitutionReport};

/// Where the updated thread goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Write to a separate file; the template is left alone
    File(PathBuf),
    /// Overwrite the template itself
    InPlace,
    /// Print to stdout
    Stdout,
}

/// What the user asked for, before any team is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matchup {
    /// A two-team thread: `home` first, `opponent` second
    Game { home: String, opponent: String },
    /// A one-team template
    Single(String),
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub matchup: Matchup,
    pub template: PathBuf,
    pub output: OutputPolicy,
    /// Start of the schedule search
    pub today: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub teams: Vec<&'static str>,
    /// `None` when printed to stdout
    pub written_to: Option<PathBuf>,
    pub report: SubstitutionReport,
    pub game: Option<GameDay>,
    /// Output text, kept for stdout mode and callers that want it
    pub text: String,
}

fn resolve_matchup(
    matchup: &Matchup,
) -> Result<(&'static TeamIdentity, Option<&'static TeamIdentity>), GdtError> {
    match matchup {
        Matchup::Single(team) => Ok((teams::resolve(team)?, None)),
        Matchup::Game { home, opponent } => {
            let home = teams::resolve(home)?;
            let opponent = teams::resolve(opponent)?;
            if home.code == opponent.code {
                return Err(GdtError::SameTeam(home.name.to_string()));
            }
            Ok((home, Some(opponent)))
        }
    }
}

/// Turn a failure of an optional source into `None` with a warning. Failures of
/// required sources, and anything that is not a fetch failure, pass through.
fn degrade<T>(result: Result<T, GdtError>) -> Result<Option<T>, GdtError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.origin().is_some_and(|o| !o.is_required()) => {
            warn!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Keep a parsed lineup page if it has anything to show, roster or injuries.
fn usable_lines(team: &TeamIdentity, lines: LineCombinations) -> Option<LineCombinations> {
    if lines.is_empty() && lines.injuries.is_empty() {
        warn!(team = team.code, "line combinations page had no players");
        return None;
    }
    Some(lines)
}

/// Fetch everything for one team. Line combinations are optional and degrade to `None`.
async fn team_snapshot<F: Fetcher>(
    fetcher: &F,
    api: &NhlApi<'_, F>,
    config: &AppConfig,
    team: &'static TeamIdentity,
    standings: &[Standing],
    summary: &[TeamSummary],
) -> Result<TeamSnapshot, GdtError> {
    let standing = standings.iter().find(|s| s.code() == team.code).ok_or_else(|| {
        GdtError::data_source(
            Source::Standings,
            &config.api_web_base,
            format!("{} is missing from the standings", team.code),
        )
    })?;

    let stats: ClubStats = api.club_stats(team.code).await?;

    let lines = degrade(lineups::fetch_line_combinations(fetcher, &config.lineups_base, team).await)?
        .and_then(|lines| usable_lines(team, lines));

    Ok(TeamSnapshot::build(team, standing, standings, summary, &stats, lines))
}

/// Next meeting of the two teams plus the home team's game number.
async fn game_day<F: Fetcher>(
    api: &NhlApi<'_, F>,
    config: &AppConfig,
    home: &TeamIdentity,
    opponent: &TeamIdentity,
    today: NaiveDate,
) -> Result<Option<GameDay>, GdtError> {
    let found = schedule::find_next_game(
        api,
        home.code,
        opponent.code,
        today,
        config.schedule_lookahead_days,
    )
    .await;

    let Some(game) = found else {
        warn!(
            "no {} vs {} game in the next {} days",
            home.code, opponent.code, config.schedule_lookahead_days
        );
        return Ok(None);
    };

    let Some(mut day) = GameDay::from_game(&game) else {
        warn!(game = game.id, "unreadable start time '{}'", game.start_time_utc);
        return Ok(None);
    };
    if let Some(season) = degrade(api.club_schedule(home.code).await)? {
        day.game_number = Some(schedule::game_number(&season, day.date));
    }
    Ok(Some(day))
}

/// Write via a sibling temp file and rename, so a failure never leaves a half-written thread.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), GdtError> {
    let err = |e: std::io::Error| GdtError::Output {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gdt".to_string());
    let tmp = dir.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    let result = fs::File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(contents.as_bytes())?;
            f.sync_all()
        })
        .and_then(|_| fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(err(e));
    }
    Ok(())
}

/// Run one update end to end.
///
/// Teams are resolved and the template read before any request is made. A
/// required source failing aborts with nothing written.
pub async fn run<F: Fetcher>(
    request: &RunRequest,
    config: &AppConfig,
    fetcher: &F,
) -> Result<RunSummary, GdtError> {
    let (first, second) = resolve_matchup(&request.matchup)?;
    let text = template::read_template(&request.template)?;
    info!(
        template = %request.template.display(),
        "updating {}{}",
        first.name,
        second.map(|t| format!(" vs {}", t.name)).unwrap_or_default()
    );

    let api = NhlApi::new(fetcher, config);
    let standings = api.standings().await?.standings;

    let season_id = standings
        .iter()
        .find(|s| s.code() == first.code)
        .and_then(|s| s.season_id);
    let summary = match season_id {
        Some(id) => api.team_summary(id).await?.data,
        None => {
            warn!("standings carry no season id; special teams will read 0");
            Vec::new()
        }
    };

    let first_snap = team_snapshot(fetcher, &api, config, first, &standings, &summary).await?;
    let second_snap = match second {
        Some(team) => Some(team_snapshot(fetcher, &api, config, team, &standings, &summary).await?),
        None => None,
    };

    let game = match second {
        Some(opponent) => game_day(&api, config, first, opponent, request.today).await?,
        None => None,
    };

    let mut body = text;
    if let Some(opponent) = second {
        body = header::apply_logos(&body, first.logo_url, opponent.logo_url);
        if let Some(day) = &game {
            body = header::apply_game_header(&body, day, &config.radio_stations);
        }
    }

    let mut blocks = vec![first_snap.lines.as_ref()];
    if let Some(snap) = &second_snap {
        blocks.push(snap.lines.as_ref());
    }
    body = header::apply_lineups(&body, &blocks);

    let first_view = TeamView {
        snapshot: &first_snap,
        game: game.as_ref(),
        radio: &config.radio_stations,
    };
    let second_view = second_snap.as_ref().map(|snapshot| TeamView {
        snapshot,
        game: game.as_ref(),
        radio: &config.radio_stations,
    });
    let result = template::substitute(
        &body,
        &first_view,
        second_view.as_ref().map(|v| v as &dyn template::FieldSource),
    );

    for tag in &result.report.unknown {
        warn!("unknown marker tag '{}' left unchanged", tag);
    }
    for tag in &result.report.skipped {
        info!("no data for '{}', left unchanged", tag);
    }

    let written_to = match &request.output {
        OutputPolicy::File(path) => {
            write_atomic(path, &result.text)?;
            Some(path.clone())
        }
        OutputPolicy::InPlace => {
            write_atomic(&request.template, &result.text)?;
            Some(request.template.clone())
        }
        OutputPolicy::Stdout => None,
    };
    info!(
        replaced = result.report.replaced.len(),
        skipped = result.report.skipped.len(),
        "substitution complete"
    );

    Ok(RunSummary {
        teams: std::iter::once(first.code)
            .chain(second.map(|t| t.code))
            .collect(),
        written_to,
        report: result.report,
        game,
        text: result.text,
    })
}
