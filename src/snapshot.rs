use crate::api::{ClubStats, Goalie, PlayerName, Skater, Standing, TeamSummary};
use crate::lineups::{Injury, LineCombinations};
use crate::teams::TeamIdentity;

/// Wins, losses, overtime losses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ot_losses: u32,
}

impl Record {
    pub fn new(wins: u32, losses: u32, ot_losses: u32) -> Self {
        Self { wins, losses, ot_losses }
    }
}

/// A stat paired with its league rank (1 = best).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ranked<T> {
    pub value: T,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leader {
    pub name: String,
    pub value: LeaderValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeaderValue {
    Count(i32),
    PlusMinus(i32),
    /// Average time on ice in seconds
    TimeOnIce(f64),
}

impl Leader {
    fn empty(value: LeaderValue) -> Self {
        Self {
            name: "N/A".to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaders {
    pub goals: Leader,
    pub assists: Leader,
    pub points: Leader,
    pub plus_minus: Leader,
    pub penalty_minutes: Leader,
    pub toi_defense: Leader,
    pub toi_forward: Leader,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalieLine {
    pub name: String,
    pub games_started: u32,
    pub record: Record,
    pub save_pct: f64,
    pub gaa: f64,
    pub shutouts: u32,
}

/// Everything the template needs about one team, built fresh per run.
#[derive(Debug, Clone)]
pub struct TeamSnapshot {
    pub team: &'static TeamIdentity,
    pub record: Record,
    pub points: u32,
    pub division_rank: u32,
    pub division_name: String,
    pub regulation_ot_wins: u32,
    pub point_pct: f64,
    pub home: Record,
    pub away: Record,
    pub shootout_wins: u32,
    pub shootout_losses: u32,
    pub last_10: Record,
    pub streak_code: String,
    pub streak_count: u32,
    pub goal_diff: Ranked<i32>,
    pub goals_for_per_game: Ranked<f64>,
    pub goals_against_per_game: Ranked<f64>,
    /// Percent (23.4), not a fraction
    pub power_play: Ranked<f64>,
    pub penalty_kill: Ranked<f64>,
    pub leaders: Leaders,
    pub goalie: Option<GoalieLine>,
    pub lines: Option<LineCombinations>,
    /// `None` when the injury list could not be fetched
    pub injuries: Option<Vec<Injury>>,
}

/// 1 + number of teams strictly better than `mine`.
fn rank_by<T, I>(mine: T, others: I, better: impl Fn(&T, &T) -> bool) -> u32
where
    I: IntoIterator<Item = T>,
{
    1 + others.into_iter().filter(|other| better(other, &mine)).count() as u32
}

/// Power play and penalty kill as percentages, with league ranks.
pub fn special_teams(team: &TeamIdentity, summary: &[TeamSummary]) -> (Ranked<f64>, Ranked<f64>) {
    let pct = |v: Option<f64>| v.unwrap_or(0.0) * 100.0;
    let row = summary.iter().find(|s| team.matches_full_name(&s.team_full_name));
    let (pp, pk) = row
        .map(|s| (pct(s.power_play_pct), pct(s.penalty_kill_pct)))
        .unwrap_or((0.0, 0.0));

    let pp_rank = rank_by(pp, summary.iter().map(|s| pct(s.power_play_pct)), |o, m| o > m);
    let pk_rank = rank_by(pk, summary.iter().map(|s| pct(s.penalty_kill_pct)), |o, m| o > m);
    (
        Ranked { value: pp, rank: pp_rank },
        Ranked { value: pk, rank: pk_rank },
    )
}

fn leader_by<F>(skaters: &[Skater], stat: F, floor: i32, wrap: fn(i32) -> LeaderValue) -> Leader
where
    F: Fn(&Skater) -> i32,
{
    let mut best: Option<(&Skater, i32)> = None;
    for skater in skaters {
        let value = stat(skater);
        if value > best.map(|(_, v)| v).unwrap_or(floor) {
            best = Some((skater, value));
        }
    }
    match best {
        Some((s, v)) => Leader {
            name: s.full_name(),
            value: wrap(v),
        },
        None => Leader::empty(wrap(0)),
    }
}

fn toi_leader<'a>(skaters: impl Iterator<Item = &'a Skater>) -> Leader {
    let mut best: Option<&Skater> = None;
    for skater in skaters {
        let current = best.map(|b| b.avg_time_on_ice_per_game).unwrap_or(0.0);
        if skater.avg_time_on_ice_per_game > current {
            best = Some(skater);
        }
    }
    match best {
        Some(s) => Leader {
            name: s.full_name(),
            value: LeaderValue::TimeOnIce(s.avg_time_on_ice_per_game),
        },
        None => Leader::empty(LeaderValue::TimeOnIce(0.0)),
    }
}

pub fn leaders(stats: &ClubStats) -> Leaders {
    let skaters = &stats.skaters;
    Leaders {
        goals: leader_by(skaters, |s| s.goals, i32::MIN, LeaderValue::Count),
        assists: leader_by(skaters, |s| s.assists, i32::MIN, LeaderValue::Count),
        points: leader_by(skaters, |s| s.points, i32::MIN, LeaderValue::Count),
        plus_minus: leader_by(skaters, |s| s.plus_minus, i32::MIN, LeaderValue::PlusMinus),
        // Nobody leads in PIM until someone has taken a penalty
        penalty_minutes: leader_by(skaters, |s| s.penalty_minutes, 0, LeaderValue::Count),
        toi_defense: toi_leader(skaters.iter().filter(|s| s.position_code == "D")),
        toi_forward: toi_leader(skaters.iter().filter(|s| s.position_code != "D")),
    }
}

fn names_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

/// The projected starter when they appear in the club stats, else the goalie with most games.
pub fn pick_goalie(goalies: &[Goalie], projected: Option<&str>) -> Option<GoalieLine> {
    let selected = projected
        .and_then(|name| goalies.iter().find(|g| names_match(&g.full_name(), name)))
        .or_else(|| {
            goalies
                .iter()
                .reduce(|best, g| if g.games_played > best.games_played { g } else { best })
        })?;

    Some(GoalieLine {
        name: selected.full_name(),
        games_started: selected.games_started.unwrap_or(selected.games_played),
        record: Record::new(selected.wins, selected.losses, selected.overtime_losses),
        save_pct: selected.save_percentage,
        gaa: selected.goals_against_average,
        shutouts: selected.shutouts,
    })
}

impl TeamSnapshot {
    /// Combine the fetched pieces for `team`. `standing` must be the team's own row of `all`.
    pub fn build(
        team: &'static TeamIdentity,
        standing: &Standing,
        all: &[Standing],
        summary: &[TeamSummary],
        stats: &ClubStats,
        lines: Option<LineCombinations>,
    ) -> Self {
        let goal_diff = standing.goal_diff();
        let gf = standing.goals_for_per_game();
        let ga = standing.goals_against_per_game();
        let (power_play, penalty_kill) = special_teams(team, summary);

        let injuries = lines.as_ref().map(|l| l.injuries.clone());
        let goalie = pick_goalie(
            &stats.goalies,
            lines.as_ref().and_then(LineCombinations::starting_goalie),
        );

        TeamSnapshot {
            team,
            record: Record::new(standing.wins, standing.losses, standing.ot_losses),
            points: standing.points,
            division_rank: standing.division_sequence,
            division_name: standing.division_name.clone(),
            regulation_ot_wins: standing.regulation_plus_ot_wins,
            point_pct: standing.point_pctg,
            home: Record::new(standing.home_wins, standing.home_losses, standing.home_ot_losses),
            away: Record::new(standing.road_wins, standing.road_losses, standing.road_ot_losses),
            shootout_wins: standing.shootout_wins,
            shootout_losses: standing.shootout_losses,
            last_10: Record::new(standing.l10_wins, standing.l10_losses, standing.l10_ot_losses),
            streak_code: standing.streak_code.clone().unwrap_or_default(),
            streak_count: standing.streak_count,
            goal_diff: Ranked {
                value: goal_diff,
                rank: rank_by(goal_diff, all.iter().map(Standing::goal_diff), |o, m| o > m),
            },
            goals_for_per_game: Ranked {
                value: gf,
                rank: rank_by(gf, all.iter().map(Standing::goals_for_per_game), |o, m| o > m),
            },
            goals_against_per_game: Ranked {
                value: ga,
                rank: rank_by(ga, all.iter().map(Standing::goals_against_per_game), |o, m| o < m),
            },
            power_play,
            penalty_kill,
            leaders: leaders(stats),
            goalie,
            lines,
            injuries,
        }
    }
}
