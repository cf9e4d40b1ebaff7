use crate::format;
use crate::schedule::GameDay;
use crate::snapshot::{Leader, LeaderValue, Record, TeamSnapshot};
use crate::template::{Field, FieldSource};

/// Shown in place of an injury list that is empty or could not be fetched.
pub const NO_INJURIES: &str = "None";

/// One team's side of the thread: its snapshot plus the shared game details.
pub struct TeamView<'a> {
    pub snapshot: &'a TeamSnapshot,
    pub game: Option<&'a GameDay>,
    pub radio: &'a str,
}

fn leader(l: &Leader) -> String {
    let value = match l.value {
        LeaderValue::Count(n) => n.to_string(),
        LeaderValue::PlusMinus(n) => format::signed(n),
        LeaderValue::TimeOnIce(secs) => format::minutes_seconds(secs),
    };
    format!("{} ({})", l.name, value)
}

fn record(rec: &Record) -> String {
    format::record(rec.wins, rec.losses, rec.ot_losses)
}

fn lines_html(groups: &[Vec<String>]) -> Option<String> {
    if groups.is_empty() {
        return None;
    }
    Some(
        groups
            .iter()
            .map(|g| format::line(g))
            .collect::<Vec<_>>()
            .join("<br>\n"),
    )
}

impl FieldSource for TeamView<'_> {
    fn value(&self, field: Field) -> Option<String> {
        let s = self.snapshot;
        let value = match field {
            Field::TeamName => s.team.name.to_string(),
            Field::Record => format!("{} (<b>{} Points</b>)", record(&s.record), s.points),
            Field::Position => format!(
                "{} &mdash; {}",
                format::ordinal(s.division_rank),
                s.division_name
            ),
            Field::RegulationOtWins => s.regulation_ot_wins.to_string(),
            Field::PointPct => format::rate(s.point_pct),
            Field::HomeRecord => record(&s.home),
            Field::AwayRecord => record(&s.away),
            Field::ShootoutRecord => format::record_pair(s.shootout_wins, s.shootout_losses),
            Field::LastTen => record(&s.last_10),
            Field::Streak => {
                let streak = format::streak(&s.streak_code, s.streak_count);
                if streak.is_empty() {
                    return None;
                }
                streak
            }
            Field::GoalDiff => format::with_rank(&format::signed(s.goal_diff.value), s.goal_diff.rank),
            Field::GoalsForPerGame => format::with_rank(
                &format::per_game(s.goals_for_per_game.value),
                s.goals_for_per_game.rank,
            ),
            Field::GoalsAgainstPerGame => format::with_rank(
                &format::per_game(s.goals_against_per_game.value),
                s.goals_against_per_game.rank,
            ),
            Field::PowerPlay => {
                format::with_rank(&format::percent(s.power_play.value), s.power_play.rank)
            }
            Field::PenaltyKill => {
                format::with_rank(&format::percent(s.penalty_kill.value), s.penalty_kill.rank)
            }
            Field::GoalsLeader => leader(&s.leaders.goals),
            Field::AssistsLeader => leader(&s.leaders.assists),
            Field::PointsLeader => leader(&s.leaders.points),
            Field::PlusMinusLeader => leader(&s.leaders.plus_minus),
            Field::PimLeader => leader(&s.leaders.penalty_minutes),
            Field::DefenseToiLeader => leader(&s.leaders.toi_defense),
            Field::ForwardToiLeader => leader(&s.leaders.toi_forward),
            Field::GoalieName => s.goalie.as_ref()?.name.clone(),
            Field::GoalieGamesStarted => s.goalie.as_ref()?.games_started.to_string(),
            Field::GoalieRecord => record(&s.goalie.as_ref()?.record),
            Field::GoalieSavePct => format::rate(s.goalie.as_ref()?.save_pct),
            Field::GoalieGaa => format::per_game(s.goalie.as_ref()?.gaa),
            Field::GoalieShutouts => s.goalie.as_ref()?.shutouts.to_string(),
            Field::ForwardLines => lines_html(&s.lines.as_ref()?.forwards)?,
            Field::DefensePairs => lines_html(&s.lines.as_ref()?.defense)?,
            Field::Injuries => match s.injuries.as_deref() {
                Some(list) if !list.is_empty() => list
                    .iter()
                    .map(|i| format!("{} ({})", i.player, i.status.label()))
                    .collect::<Vec<_>>()
                    .join("<br>\n"),
                _ => NO_INJURIES.to_string(),
            },
            Field::GameNumber => self.game?.game_number?.to_string(),
            Field::GameDate => self.game?.date_label.clone(),
            Field::GameTime => self.game?.time_label.clone(),
            Field::Tv => {
                let tv = &self.game?.tv;
                if tv.is_empty() {
                    return None;
                }
                tv.join(", ")
            }
            Field::Radio => {
                if self.radio.trim().is_empty() {
                    return None;
                }
                self.radio.to_string()
            }
        };
        Some(value)
    }
}
