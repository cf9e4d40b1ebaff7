//! Display formatting for stat values.
//!
//! Everything here is pure. Where a value gets parsed back out of a thread
//! (percentages, records, ordinals) the inverse lives next to the formatter.

/// `1st`, `2nd`, `3rd`, `4th`, `11th`, `21st`
pub fn ordinal(n: u32) -> String {
    let suffix = if (11..=13).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{}{}", n, suffix)
}

pub fn parse_ordinal(s: &str) -> Option<u32> {
    let s = s.trim();
    let digits = s.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let n: u32 = digits.parse().ok()?;
    (ordinal(n) == s).then_some(n)
}

/// One decimal with a percent sign: `23.4%`
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn parse_percent(s: &str) -> Option<f64> {
    s.trim().strip_suffix('%')?.trim().parse().ok()
}

/// Three-decimal rate without the leading zero, truncated: `.647`, `.915`.
/// Only a perfect 1.0 shows as `1.000`.
pub fn rate(value: f64) -> String {
    if value >= 1.0 {
        return "1.000".to_string();
    }
    // Nudge past float noise so .29 stays .290
    let thousandths = ((value.max(0.0) * 1000.0 + 1e-6).floor() as u32).min(999);
    format!(".{:03}", thousandths)
}

/// One forward line or defense pair: `A / B / C`
pub fn line(players: &[String]) -> String {
    players.join(" / ")
}

/// `W-L-OT`
pub fn record(wins: u32, losses: u32, ot_losses: u32) -> String {
    format!("{}-{}-{}", wins, losses, ot_losses)
}

/// `W-L`, used for shootouts
pub fn record_pair(wins: u32, losses: u32) -> String {
    format!("{}-{}", wins, losses)
}

pub fn parse_record(s: &str) -> Option<(u32, u32, u32)> {
    let mut parts = s.trim().split('-').map(|p| p.trim().parse::<u32>());
    let w = parts.next()?.ok()?;
    let l = parts.next()?.ok()?;
    let ot = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((w, l, ot))
}

/// `W3`, `L2`, `OT1`. Empty code (start of season) yields an empty string.
pub fn streak(code: &str, count: u32) -> String {
    let code = code.trim();
    if code.is_empty() {
        return String::new();
    }
    format!("{}{}", code.to_uppercase(), count)
}

/// `+5`, `0`, `-3`
pub fn signed(value: i32) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Two decimals, for goals per game and GAA
pub fn per_game(value: f64) -> String {
    format!("{:.2}", value)
}

/// Seconds to `m:ss`
pub fn minutes_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// `value (rank)` as shown in the stats tables
pub fn with_rank(value: &str, rank: u32) -> String {
    format!("{} ({})", value, ordinal(rank))
}
