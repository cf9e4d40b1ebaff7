use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::errors::GdtError;
use crate::net::{get_json, Fetcher, Source};

/// `{"default": "..."}` wrapper the NHL API uses for localized strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizedName {
    pub default: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StandingsResponse {
    pub standings: Vec<Standing>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Standing {
    pub team_abbrev: LocalizedName,
    pub season_id: Option<u64>,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub ot_losses: u32,
    pub points: u32,
    pub division_sequence: u32,
    pub division_name: String,
    pub regulation_plus_ot_wins: u32,
    pub point_pctg: f64,
    pub home_wins: u32,
    pub home_losses: u32,
    pub home_ot_losses: u32,
    pub road_wins: u32,
    pub road_losses: u32,
    pub road_ot_losses: u32,
    pub shootout_wins: u32,
    pub shootout_losses: u32,
    pub l10_wins: u32,
    pub l10_losses: u32,
    pub l10_ot_losses: u32,
    pub streak_code: Option<String>,
    pub streak_count: u32,
    pub goal_for: i32,
    pub goal_against: i32,
    pub goal_differential: Option<i32>,
}

impl Standing {
    pub fn code(&self) -> &str {
        &self.team_abbrev.default
    }

    pub fn goal_diff(&self) -> i32 {
        self.goal_differential
            .unwrap_or(self.goal_for - self.goal_against)
    }

    pub fn goals_for_per_game(&self) -> f64 {
        per_game(self.goal_for, self.games_played)
    }

    pub fn goals_against_per_game(&self) -> f64 {
        per_game(self.goal_against, self.games_played)
    }
}

fn per_game(total: i32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        total as f64 / games as f64
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSummaryResponse {
    pub data: Vec<TeamSummary>,
}

/// Season summary row; percentages are fractions (0.234).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamSummary {
    pub team_full_name: String,
    pub power_play_pct: Option<f64>,
    pub penalty_kill_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClubStats {
    pub skaters: Vec<Skater>,
    pub goalies: Vec<Goalie>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skater {
    pub first_name: LocalizedName,
    pub last_name: LocalizedName,
    pub position_code: String,
    pub goals: i32,
    pub assists: i32,
    pub points: i32,
    pub plus_minus: i32,
    pub penalty_minutes: i32,
    /// Seconds
    pub avg_time_on_ice_per_game: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Goalie {
    pub first_name: LocalizedName,
    pub last_name: LocalizedName,
    pub games_played: u32,
    pub games_started: Option<u32>,
    pub wins: u32,
    pub losses: u32,
    pub overtime_losses: u32,
    pub save_percentage: f64,
    pub goals_against_average: f64,
    pub shutouts: u32,
}

pub trait PlayerName {
    fn first(&self) -> &str;
    fn last(&self) -> &str;

    fn full_name(&self) -> String {
        format!("{} {}", self.first(), self.last()).trim().to_string()
    }
}

impl PlayerName for Skater {
    fn first(&self) -> &str {
        &self.first_name.default
    }
    fn last(&self) -> &str {
        &self.last_name.default
    }
}

impl PlayerName for Goalie {
    fn first(&self) -> &str {
        &self.first_name.default
    }
    fn last(&self) -> &str {
        &self.last_name.default
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub game_week: Vec<ScheduleDay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleDay {
    pub date: String,
    pub games: Vec<ScheduledGame>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduledGame {
    pub id: u64,
    #[serde(rename = "startTimeUTC")]
    pub start_time_utc: String,
    #[serde(rename = "easternUTCOffset")]
    pub eastern_utc_offset: Option<String>,
    pub away_team: GameTeam,
    pub home_team: GameTeam,
    pub tv_broadcasts: Vec<Broadcast>,
    pub game_center_link: Option<String>,
}

impl ScheduledGame {
    pub fn involves(&self, a: &str, b: &str) -> bool {
        let teams = [self.away_team.abbrev.as_str(), self.home_team.abbrev.as_str()];
        teams.contains(&a) && teams.contains(&b)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTeam {
    pub abbrev: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Broadcast {
    pub network: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClubSchedule {
    pub games: Vec<ClubGame>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClubGame {
    pub game_date: String,
}

/// Typed access to the NHL web and stats APIs over any [`Fetcher`].
pub struct NhlApi<'a, F: Fetcher> {
    fetcher: &'a F,
    api_web: &'a str,
    stats_api: &'a str,
}

impl<'a, F: Fetcher> NhlApi<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a AppConfig) -> Self {
        Self {
            fetcher,
            api_web: config.api_web_base.trim_end_matches('/'),
            stats_api: config.stats_api_base.trim_end_matches('/'),
        }
    }

    pub async fn standings(&self) -> Result<StandingsResponse, GdtError> {
        let url = format!("{}/v1/standings/now", self.api_web);
        get_json(self.fetcher, Source::Standings, &url).await
    }

    pub async fn team_summary(&self, season_id: u64) -> Result<TeamSummaryResponse, GdtError> {
        let url = format!(
            "{}/stats/rest/en/team/summary?cayenneExp=seasonId={}",
            self.stats_api, season_id
        );
        get_json(self.fetcher, Source::TeamSummary, &url).await
    }

    pub async fn club_stats(&self, code: &str) -> Result<ClubStats, GdtError> {
        let url = format!("{}/v1/club-stats/{}/now", self.api_web, code);
        get_json(self.fetcher, Source::ClubStats, &url).await
    }

    /// The week of games starting at `date`.
    pub async fn schedule(&self, date: NaiveDate) -> Result<ScheduleResponse, GdtError> {
        let url = format!("{}/v1/schedule/{}", self.api_web, date.format("%Y-%m-%d"));
        get_json(self.fetcher, Source::Schedule, &url).await
    }

    pub async fn club_schedule(&self, code: &str) -> Result<ClubSchedule, GdtError> {
        let url = format!("{}/v1/club-schedule-season/{}/now", self.api_web, code);
        get_json(self.fetcher, Source::ClubSchedule, &url).await
    }
}
