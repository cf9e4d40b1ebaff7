use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::GdtError;
use crate::net::{Fetcher, Source};
use crate::teams::TeamIdentity;

static PLAYER_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="/players/news/([a-zA-Z0-9-]+)/\d+""#).unwrap()
});

const INJURIES_HEADING: &str = ">Injuries<";
/// How far past the heading injured players are looked for
const INJURY_WINDOW: usize = 10_000;
/// How far past a player link their status badge is looked for
const STATUS_WINDOW: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjuryStatus {
    Out,
    DayToDay,
    LongTermIr,
    InjuredReserve,
}

impl InjuryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InjuryStatus::Out => "OUT",
            InjuryStatus::DayToDay => "DTD",
            InjuryStatus::LongTermIr => "LTIR",
            InjuryStatus::InjuredReserve => "IR",
        }
    }

    /// Reads the status badge from markup following a player link. IR when nothing matches.
    fn from_markup(nearby: &str) -> Self {
        let nearby = nearby.to_lowercase();
        if nearby.contains(">out<") || nearby.contains(">out ") {
            InjuryStatus::Out
        } else if nearby.contains(">dtd<") || nearby.contains("day-to-day") {
            InjuryStatus::DayToDay
        } else if nearby.contains(">ltir<") {
            InjuryStatus::LongTermIr
        } else {
            InjuryStatus::InjuredReserve
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injury {
    pub player: String,
    pub status: InjuryStatus,
}

/// Projected lineup as published on the line-combinations page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCombinations {
    pub forwards: Vec<Vec<String>>,
    pub defense: Vec<Vec<String>>,
    pub goalies: Vec<String>,
    pub injuries: Vec<Injury>,
}

impl LineCombinations {
    pub fn starting_goalie(&self) -> Option<&str> {
        self.goalies.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.forwards.is_empty() && self.defense.is_empty() && self.goalies.is_empty()
    }
}

/// `connor-mcdavid` → `Connor McDavid`, `j-t-miller` → `J.T. Miller`,
/// `ryan-o-reilly` → `Ryan O'Reilly`
pub fn slug_to_name(slug: &str) -> String {
    let words: Vec<&str> = slug.split('-').filter(|w| !w.is_empty()).collect();
    let mut parts = Vec::new();
    let mut i = 0;

    while i < words.len() {
        let word = words[i];
        let lower = word.to_lowercase();

        if lower == "o" && words.get(i + 1).is_some_and(|next| next.len() > 1) {
            i += 1;
            parts.push(format!("O'{}", capitalize(words[i])));
        } else if word.chars().count() == 1 {
            let mut initials = vec![word.to_uppercase()];
            while let Some(next) = words.get(i + 1).filter(|w| w.chars().count() == 1) {
                initials.push(next.to_uppercase());
                i += 1;
            }
            parts.push(format!("{}.", initials.join(".")));
        } else if lower.starts_with("mc") && lower.len() > 2 {
            parts.push(format!("Mc{}", capitalize(&word[2..])));
        } else if lower.starts_with("mac") && lower.len() > 3 {
            parts.push(format!("Mac{}", capitalize(&word[3..])));
        } else {
            parts.push(capitalize(word));
        }
        i += 1;
    }

    parts.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Largest char boundary in `s` not past `index`.
fn floor_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn player_slugs(html: &str) -> impl Iterator<Item = &str> {
    PLAYER_LINK
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Parse the line-combinations page.
///
/// Player links before the injuries heading are taken in page order: twelve
/// forwards (four lines of three), six defensemen (three pairs), two goalies.
pub fn parse_line_combinations(html: &str) -> LineCombinations {
    let injuries_at = html.find(INJURIES_HEADING);
    let roster_html = match injuries_at {
        Some(i) if i > 0 => &html[..i],
        _ => html,
    };

    let mut seen = HashSet::new();
    let names: Vec<String> = player_slugs(roster_html)
        .filter(|slug| seen.insert(slug.to_lowercase()))
        .map(slug_to_name)
        .collect();

    let forwards = names
        .iter()
        .take(12)
        .cloned()
        .collect::<Vec<_>>()
        .chunks(3)
        .map(<[String]>::to_vec)
        .collect();
    let defense = names
        .iter()
        .skip(12)
        .take(6)
        .cloned()
        .collect::<Vec<_>>()
        .chunks(2)
        .map(<[String]>::to_vec)
        .collect();
    let goalies = names.iter().skip(18).take(2).cloned().collect();

    let injuries = match injuries_at {
        Some(start) if start > 0 => parse_injuries(&html[start..], &seen),
        _ => Vec::new(),
    };

    LineCombinations {
        forwards,
        defense,
        goalies,
        injuries,
    }
}

/// Players linked after the injuries heading who are not in the lineup.
fn parse_injuries(from_heading: &str, roster: &HashSet<String>) -> Vec<Injury> {
    let section = &from_heading[..floor_boundary(from_heading, INJURY_WINDOW)];
    let lower = section.to_lowercase();
    let mut seen = HashSet::new();
    let mut injuries = Vec::new();

    for slug in player_slugs(section) {
        let key = slug.to_lowercase();
        if roster.contains(&key) || !seen.insert(key.clone()) {
            continue;
        }
        let status = match lower.find(&key) {
            Some(at) => {
                let end = floor_boundary(&lower, at + STATUS_WINDOW);
                InjuryStatus::from_markup(&lower[at..end])
            }
            None => InjuryStatus::InjuredReserve,
        };
        injuries.push(Injury {
            player: slug_to_name(slug),
            status,
        });
    }
    injuries
}

/// Fetch and parse a team's line-combinations page.
pub async fn fetch_line_combinations<F: Fetcher>(
    fetcher: &F,
    base: &str,
    team: &TeamIdentity,
) -> Result<LineCombinations, GdtError> {
    let url = format!(
        "{}/teams/{}/line-combinations/",
        base.trim_end_matches('/'),
        team.slug
    );
    let html = fetcher.get_text(Source::LineCombinations, &url).await?;
    Ok(parse_line_combinations(&html))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(slug: &str, id: u32) -> String {
        format!(r#"<a href="/players/news/{}/{}">x</a>"#, slug, id)
    }

    #[test]
    fn test_slug_to_name() {
        assert_eq!(slug_to_name("connor-mcdavid"), "Connor McDavid");
        assert_eq!(slug_to_name("nathan-mackinnon"), "Nathan MacKinnon");
        assert_eq!(slug_to_name("j-t-miller"), "J.T. Miller");
        assert_eq!(slug_to_name("ryan-o-reilly"), "Ryan O'Reilly");
        assert_eq!(slug_to_name("igor-shesterkin"), "Igor Shesterkin");
        assert_eq!(slug_to_name("k-andre-miller"), "K. Andre Miller");
    }

    #[test]
    fn test_parse_lines_and_goalies() {
        let mut html = String::from("<div>");
        for i in 0..20 {
            html.push_str(&link(&format!("player-{}", char::from(b'a' + i as u8)), 100 + i));
        }
        // Duplicate link (mobile + desktop layouts) is ignored
        html.push_str(&link("PLAYER-A", 100));
        html.push_str("</div>");

        let lines = parse_line_combinations(&html);
        assert_eq!(lines.forwards.len(), 4);
        assert_eq!(lines.forwards[0], vec!["Player A", "Player B", "Player C"]);
        assert_eq!(lines.defense.len(), 3);
        assert_eq!(lines.defense[0], vec!["Player M", "Player N"]);
        assert_eq!(lines.goalies, vec!["Player S", "Player T"]);
        assert_eq!(lines.starting_goalie(), Some("Player S"));
        assert!(lines.injuries.is_empty());
    }

    #[test]
    fn test_parse_injuries_with_statuses() {
        let filler = format!("<p>{}</p>", " ".repeat(STATUS_WINDOW + 100));
        let mut html = String::new();
        html.push_str(&link("artemi-panarin", 1));
        html.push_str("<h2>Injuries</h2>");
        html.push_str(&link("artemi-panarin", 1));
        html.push_str(&link("chris-kreider", 2));
        html.push_str("<span>day-to-day</span>");
        html.push_str(&filler);
        html.push_str(&link("filip-chytil", 3));
        html.push_str("<span>LTIR</span>");
        html.push_str(&filler);
        html.push_str(&link("jacob-trouba", 4));
        html.push_str("<span>Out</span>");
        html.push_str(&filler);
        html.push_str(&link("kaapo-kakko", 5));

        let lines = parse_line_combinations(&html);
        assert_eq!(lines.forwards, vec![vec!["Artemi Panarin".to_string()]]);
        let got: Vec<(&str, &str)> = lines
            .injuries
            .iter()
            .map(|i| (i.player.as_str(), i.status.label()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Chris Kreider", "DTD"),
                ("Filip Chytil", "LTIR"),
                ("Jacob Trouba", "OUT"),
                ("Kaapo Kakko", "IR"),
            ]
        );
    }

    #[test]
    fn test_status_from_markup() {
        assert_eq!(InjuryStatus::from_markup("<b>Out</b>"), InjuryStatus::Out);
        assert_eq!(InjuryStatus::from_markup("<b>DTD</b>"), InjuryStatus::DayToDay);
        assert_eq!(InjuryStatus::from_markup("<b>LTIR</b>"), InjuryStatus::LongTermIr);
        assert_eq!(InjuryStatus::from_markup("<b>IR</b>"), InjuryStatus::InjuredReserve);
        assert_eq!(InjuryStatus::from_markup("nothing"), InjuryStatus::InjuredReserve);
    }

    #[test]
    fn test_page_without_players() {
        let lines = parse_line_combinations("<html><body>Coming soon</body></html>");
        assert!(lines.is_empty());
        assert_eq!(lines.starting_goalie(), None);
    }

    #[test]
    fn test_injury_window_respects_char_boundaries() {
        let mut html = String::from("<div>>Injuries<");
        html.push_str(&"é".repeat(INJURY_WINDOW));
        html.push_str(&link("late-player", 9));
        let lines = parse_line_combinations(&html);
        assert!(lines.injuries.is_empty());
    }
}
