//! In-place rewrites for the fixed parts of a thread: the header (game number
//! and date, puck drop, broadcasters, GameCenter link, logos) and each team's
//! lineup block.
//!
//! These predate the marker syntax, so they match the thread's own markup.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;

use crate::format;
use crate::lineups::LineCombinations;
use crate::schedule::GameDay;
use crate::template::Sections;

static GAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(REGULAR SEASON GAME #)\d+(\s*&mdash;\s*)\d+/\d+/\d+").unwrap());
static TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(<b>Time</b>:\s*)\d+:\d+\s*[AP]M").unwrap());
static TV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(<b>TV</b><span>:</span>&nbsp;)[^<]+").unwrap());
static RADIO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(<b>&nbsp;Radio</b>:\s*)[^<]+").unwrap());
static GAMECENTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(href=")[^"]*nhl\.com/gamecenter[^"]*(")"#).unwrap());
static LOGO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(data-src=")[^"]*(?:invisioncic\.com|blueshirtsbrotherhood\.com)[^"]*\.png[^"]*(")"#)
        .unwrap()
});

static LINEUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(<b>Starting Lineup:\^?</b>\s*</h3>\s*<p>).*?(</p>\s*<p>)").unwrap()
});
/// Pairs after a `<p>&nbsp;</p>` spacer
static DEFENSE_SPACER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(&nbsp;\s*</p>\s*<p>).*?(</p>\s*(?:<h4>|<h3>\s*<b>Starting Goaltender))")
        .unwrap()
});
/// Pairs in a paragraph opening with `<br>`
static DEFENSE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(</p>\s*<p>\s*)<br>.*?(</p>\s*(?:<h4>|<h3>\s*<b>Starting Goaltender))")
        .unwrap()
});
static STARTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(<b>Starting Goaltender:</b>\s*</h3>\s*<p>)\s*[^<\n]+(<br>|&nbsp;)").unwrap()
});

fn replace_first(re: &Regex, text: &str, value: &str) -> String {
    re.replacen(text, 1, |c: &Captures| {
        let tail = c.get(2).map(|m| m.as_str()).unwrap_or("");
        format!("{}{}{}", &c[1], value, tail)
    })
    .into_owned()
}

/// Rewrite the header lines for `game`. Lines whose value is unknown stay as they are.
pub fn apply_game_header(text: &str, game: &GameDay, radio: &str) -> String {
    let mut out = match game.game_number {
        Some(n) => GAME_LINE
            .replacen(text, 1, |c: &Captures| {
                format!("{}{}{}{}", &c[1], n, &c[2], game.date_label)
            })
            .into_owned(),
        None => text.to_string(),
    };

    out = replace_first(&TIME, &out, &game.time_label);
    if !game.tv.is_empty() {
        out = replace_first(&TV, &out, &game.tv.join(", "));
    }
    if !radio.trim().is_empty() {
        out = replace_first(&RADIO, &out, radio);
    }
    if let Some(url) = &game.gamecenter_url {
        out = replace_first(&GAMECENTER, &out, url);
    }
    out
}

/// Swap the four header logos: 1st and 3rd are the first team, 2nd and 4th its opponent.
pub fn apply_logos(text: &str, first_logo: &str, second_logo: &str) -> String {
    if first_logo.is_empty() || second_logo.is_empty() {
        warn!("missing logo url, leaving logos unchanged");
        return text.to_string();
    }
    let found = LOGO.find_iter(text).count();
    if found < 4 {
        warn!("found {} logo images, expected 4", found);
    }

    let mut index = 0;
    LOGO.replace_all(text, |c: &Captures| {
        let logo = match index {
            0 | 2 => Some(first_logo),
            1 | 3 => Some(second_logo),
            _ => None,
        };
        index += 1;
        match logo {
            Some(url) => format!("{}{}{}", &c[1], url, &c[2]),
            None => c[0].to_string(),
        }
    })
    .into_owned()
}

fn block(groups: &[Vec<String>]) -> String {
    groups
        .iter()
        .map(|g| format::line(g))
        .collect::<Vec<_>>()
        .join("<br>\n\t\t")
}

/// Rewrite one team's starting lineup, defense pairs and starting goaltender.
/// Parts the lineup page did not provide stay as they are.
pub fn apply_lineup(section: &str, lines: &LineCombinations) -> String {
    let mut out = section.to_string();

    if !lines.forwards.is_empty() {
        out = replace_first(&LINEUP, &out, &format!("\n\t\t{}\n\t", block(&lines.forwards)));
    }

    if !lines.defense.is_empty() {
        let pairs = block(&lines.defense);
        if DEFENSE_SPACER.is_match(&out) {
            out = replace_first(&DEFENSE_SPACER, &out, &format!("\n\t\t{}\n\t", pairs));
        } else {
            // The leading <br> is kept so the block is found again next time
            out = replace_first(&DEFENSE_BREAK, &out, &format!("<br>\n\t\t{}\n\t", pairs));
        }
    }

    if let Some(goalie) = lines.starting_goalie() {
        out = replace_first(&STARTER, &out, &format!("\n\t\t{}", goalie));
    }
    out
}

fn keep_or_apply(section: &str, lines: Option<&LineCombinations>) -> String {
    match lines {
        Some(lines) => apply_lineup(section, lines),
        None => section.to_string(),
    }
}

/// Apply lineup blocks team by team: one entry per team, scoped by [`Sections`]
/// like the markers. `None` leaves that team's block untouched.
pub fn apply_lineups(text: &str, lineups: &[Option<&LineCombinations>]) -> String {
    match lineups {
        [] => text.to_string(),
        [only] => keep_or_apply(text, *only),
        [first, second, ..] => {
            let sections = Sections::locate(text);
            let mut out = keep_or_apply(&text[..sections.boundary], *first);
            out.push_str(&keep_or_apply(&text[sections.boundary..sections.end], *second));
            out.push_str(&text[sections.end..]);
            out
        }
    }
}
