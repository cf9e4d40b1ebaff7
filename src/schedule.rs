use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use chrono_tz::America::New_York;
use tracing::{debug, info, warn};

use crate::api::{ClubSchedule, NhlApi, ScheduledGame};
use crate::net::Fetcher;

/// The next meeting of the two teams, formatted for the thread header.
#[derive(Debug, Clone, PartialEq)]
pub struct GameDay {
    pub date: NaiveDate,
    /// `11/2/25`
    pub date_label: String,
    /// `7:00 PM`, Eastern
    pub time_label: String,
    pub tv: Vec<String>,
    pub gamecenter_url: Option<String>,
    pub game_number: Option<u32>,
}

/// Parse `-05:00` style offsets.
fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let offset = offset.trim();
    let (sign, rest) = match offset.chars().next()? {
        '-' => (-1, &offset[1..]),
        '+' => (1, &offset[1..]),
        _ => (1, offset),
    };
    let (h, m) = rest.split_once(':').unwrap_or((rest, "0"));
    let secs = h.parse::<i32>().ok()? * 3600 + m.parse::<i32>().ok()? * 60;
    FixedOffset::east_opt(sign * secs)
}

impl GameDay {
    /// Build the header view of a scheduled game. Returns `None` when the start time is unparseable.
    pub fn from_game(game: &ScheduledGame) -> Option<Self> {
        let utc: DateTime<Utc> = DateTime::parse_from_rfc3339(&game.start_time_utc)
            .ok()?
            .with_timezone(&Utc);

        // Prefer the API's own offset; the tz database covers older payloads without it
        let (date, date_label, time_label) = match game
            .eastern_utc_offset
            .as_deref()
            .and_then(parse_offset)
        {
            Some(offset) => {
                let local = utc.with_timezone(&offset);
                (
                    local.date_naive(),
                    local.format("%-m/%-d/%y").to_string(),
                    local.format("%-I:%M %p").to_string(),
                )
            }
            None => {
                let local = utc.with_timezone(&New_York);
                (
                    local.date_naive(),
                    local.format("%-m/%-d/%y").to_string(),
                    local.format("%-I:%M %p").to_string(),
                )
            }
        };

        let mut tv: Vec<String> = Vec::new();
        for b in &game.tv_broadcasts {
            if b.country_code == "US" && !b.network.is_empty() && !tv.contains(&b.network) {
                tv.push(b.network.clone());
            }
        }

        let gamecenter_url = game
            .game_center_link
            .as_deref()
            .filter(|l| !l.is_empty())
            .map(|l| {
                if l.starts_with("http") {
                    l.to_string()
                } else {
                    format!("https://www.nhl.com{}", l)
                }
            });

        Some(GameDay {
            date,
            date_label,
            time_label,
            tv,
            gamecenter_url,
            game_number: None,
        })
    }
}

/// Number of the team's season games played on or before `date`.
pub fn game_number(schedule: &ClubSchedule, date: NaiveDate) -> u32 {
    schedule
        .games
        .iter()
        .filter_map(|g| NaiveDate::parse_from_str(&g.game_date, "%Y-%m-%d").ok())
        .filter(|d| *d <= date)
        .count() as u32
}

/// Walk the weekly schedule from `today` looking for a game between `a` and `b`.
///
/// A week that fails to load is logged and skipped.
pub async fn find_next_game<F: Fetcher>(
    api: &NhlApi<'_, F>,
    a: &str,
    b: &str,
    today: NaiveDate,
    lookahead_days: u32,
) -> Option<ScheduledGame> {
    let horizon = today + Duration::days(i64::from(lookahead_days));
    let mut cursor = today;

    while cursor <= horizon {
        debug!(%cursor, "scanning schedule week");
        let week = match api.schedule(cursor).await {
            Ok(week) => week,
            Err(e) => {
                warn!("{}", e);
                cursor += Duration::days(7);
                continue;
            }
        };
        let mut last_day = None;

        for day in &week.game_week {
            if let Some(game) = day.games.iter().find(|g| g.involves(a, b)) {
                info!(game = game.id, "found {} vs {} on {}", a, b, day.date);
                return Some(game.clone());
            }
            if let Ok(d) = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d") {
                last_day = Some(d);
            }
        }

        cursor = match last_day {
            Some(d) if d >= cursor => d + Duration::days(1),
            _ => cursor + Duration::days(7),
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Broadcast, ClubGame, GameTeam};
    use crate::config::AppConfig;
    use crate::errors::GdtError;
    use crate::net::Source;

    fn game(start: &str, offset: Option<&str>) -> ScheduledGame {
        ScheduledGame {
            id: 2025020190,
            start_time_utc: start.to_string(),
            eastern_utc_offset: offset.map(str::to_string),
            away_team: GameTeam { abbrev: "NJD".to_string() },
            home_team: GameTeam { abbrev: "NYR".to_string() },
            tv_broadcasts: vec![
                Broadcast { network: "MSG".to_string(), country_code: "US".to_string() },
                Broadcast { network: "SN".to_string(), country_code: "CA".to_string() },
                Broadcast { network: "MSG".to_string(), country_code: "US".to_string() },
                Broadcast { network: "TNT".to_string(), country_code: "US".to_string() },
            ],
            game_center_link: Some("/gamecenter/njd-vs-nyr/2025/11/02/2025020190".to_string()),
        }
    }

    #[test]
    fn test_game_day_uses_api_offset() {
        let day = GameDay::from_game(&game("2025-11-02T23:00:00Z", Some("-05:00"))).unwrap();
        assert_eq!(day.date_label, "11/2/25");
        assert_eq!(day.time_label, "6:00 PM");
        assert_eq!(day.tv, vec!["MSG", "TNT"]);
        assert_eq!(
            day.gamecenter_url.as_deref(),
            Some("https://www.nhl.com/gamecenter/njd-vs-nyr/2025/11/02/2025020190")
        );
    }

    #[test]
    fn test_game_day_falls_back_to_new_york_time() {
        // October: EDT, UTC-4
        let day = GameDay::from_game(&game("2025-10-12T00:30:00Z", None)).unwrap();
        assert_eq!(day.date_label, "10/11/25");
        assert_eq!(day.time_label, "8:30 PM");
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2025, 10, 11).unwrap());
    }

    #[test]
    fn test_noon_and_midnight() {
        let noon = GameDay::from_game(&game("2025-12-01T17:00:00Z", Some("-05:00"))).unwrap();
        assert_eq!(noon.time_label, "12:00 PM");
        let late = GameDay::from_game(&game("2025-12-01T05:15:00Z", Some("-05:00"))).unwrap();
        assert_eq!(late.time_label, "12:15 AM");
    }

    #[test]
    fn test_bad_start_time() {
        assert!(GameDay::from_game(&game("TBD", None)).is_none());
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("-04:00"), FixedOffset::west_opt(4 * 3600));
        assert_eq!(parse_offset("+01:30"), FixedOffset::east_opt(5400));
        assert_eq!(parse_offset("junk"), None);
        assert_eq!(parse_offset(""), None);
    }

    #[test]
    fn test_game_number() {
        let schedule = ClubSchedule {
            games: ["2025-10-08", "2025-10-11", "2025-11-02", "2025-11-05", "bad"]
                .iter()
                .map(|d| ClubGame { game_date: d.to_string() })
                .collect(),
        };
        let date = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
        assert_eq!(game_number(&schedule, date), 3);
    }

    /// Fails the first week, has the game in the second.
    struct FlakyWeeks;

    impl Fetcher for FlakyWeeks {
        async fn get_text(&self, source: Source, url: &str) -> Result<String, GdtError> {
            if url.ends_with("/v1/schedule/2025-11-01") {
                return Err(GdtError::data_source(source, url, "HTTP 502"));
            }
            if url.ends_with("/v1/schedule/2025-11-08") {
                let week = serde_json::json!({
                    "gameWeek": [{"date": "2025-11-09", "games": [{
                        "id": 2025020250,
                        "startTimeUTC": "2025-11-10T00:00:00Z",
                        "awayTeam": {"abbrev": "NYR"},
                        "homeTeam": {"abbrev": "NJD"}
                    }]}]
                });
                return Ok(week.to_string());
            }
            Ok(r#"{"gameWeek": []}"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_failed_week_is_skipped() {
        let config = AppConfig {
            api_web_base: "http://mock".to_string(),
            ..AppConfig::default()
        };
        let api = NhlApi::new(&FlakyWeeks, &config);
        let today = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();

        let game = find_next_game(&api, "NYR", "NJD", today, 30).await.unwrap();
        assert_eq!(game.id, 2025020250);

        assert!(find_next_game(&api, "NYR", "BOS", today, 14).await.is_none());
    }
}
