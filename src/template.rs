//! Marker substitution for game day thread templates.
//!
//! A marker is the literal `***UPDATE <TAG>***`. It either sits inside an
//! element's attribute (`<p data-gdt="***UPDATE RECORD***">…</p>`), in which
//! case the element's content is replaced and the marker survives for the next
//! refresh, or loose in the text, in which case the marker itself is replaced.
//!
//! Two-team templates are split by `<hr>` separators; see [`Sections`].

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::GdtError;

static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*\*\s*UPDATE\s+([^*<>]+?)\s*\*\*\*").unwrap());
static HR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<hr\b[^>]*>").unwrap());

/// Every value a template can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TeamName,
    Record,
    Position,
    RegulationOtWins,
    PointPct,
    HomeRecord,
    AwayRecord,
    ShootoutRecord,
    LastTen,
    Streak,
    GoalDiff,
    GoalsForPerGame,
    GoalsAgainstPerGame,
    PowerPlay,
    PenaltyKill,
    GoalsLeader,
    AssistsLeader,
    PointsLeader,
    PlusMinusLeader,
    PimLeader,
    DefenseToiLeader,
    ForwardToiLeader,
    GoalieName,
    GoalieGamesStarted,
    GoalieRecord,
    GoalieSavePct,
    GoalieGaa,
    GoalieShutouts,
    ForwardLines,
    DefensePairs,
    Injuries,
    GameNumber,
    GameDate,
    GameTime,
    Tv,
    Radio,
}

/// Tag text to field. Tags are upper case, single-spaced.
pub static MARKERS: &[(&str, Field)] = &[
    ("TEAM", Field::TeamName),
    ("RECORD", Field::Record),
    ("POSITION", Field::Position),
    ("ROW", Field::RegulationOtWins),
    ("P%", Field::PointPct),
    ("RECORD HOME", Field::HomeRecord),
    ("HOME RECORD", Field::HomeRecord),
    ("RECORD AWAY", Field::AwayRecord),
    ("AWAY RECORD", Field::AwayRecord),
    ("ROAD RECORD", Field::AwayRecord),
    ("S/O", Field::ShootoutRecord),
    ("LAST 10", Field::LastTen),
    ("L10", Field::LastTen),
    ("STREAK", Field::Streak),
    ("DIFF", Field::GoalDiff),
    ("GF/GP", Field::GoalsForPerGame),
    ("GA/GP", Field::GoalsAgainstPerGame),
    ("PP%", Field::PowerPlay),
    ("PK%", Field::PenaltyKill),
    ("GOALS", Field::GoalsLeader),
    ("ASSISTS", Field::AssistsLeader),
    ("POINTS", Field::PointsLeader),
    ("+/-", Field::PlusMinusLeader),
    ("PIM", Field::PimLeader),
    ("TOI/G (D)", Field::DefenseToiLeader),
    ("TOI/G (F)", Field::ForwardToiLeader),
    ("GOALIE", Field::GoalieName),
    ("STARTER", Field::GoalieName),
    ("GS", Field::GoalieGamesStarted),
    ("REC", Field::GoalieRecord),
    ("SV%", Field::GoalieSavePct),
    ("GAA", Field::GoalieGaa),
    ("SO", Field::GoalieShutouts),
    ("LINES", Field::ForwardLines),
    ("FORWARDS", Field::ForwardLines),
    ("DEFENSE", Field::DefensePairs),
    ("INJURIES", Field::Injuries),
    ("GAME NUMBER", Field::GameNumber),
    ("DATE", Field::GameDate),
    ("TIME", Field::GameTime),
    ("TV", Field::Tv),
    ("RADIO", Field::Radio),
];

static MARKER_TABLE: Lazy<HashMap<&'static str, Field>> =
    Lazy::new(|| MARKERS.iter().copied().collect());

/// Resolve a marker's tag to a field.
///
/// The longest whitespace-token suffix that is a known tag wins, so a team
/// prefix (`NYR RECORD`) is ignored and `RECORD HOME` beats `HOME`.
pub fn field_for_tag(tag: &str) -> Option<Field> {
    let tokens: Vec<String> = tag.split_whitespace().map(str::to_uppercase).collect();
    (0..tokens.len()).find_map(|start| MARKER_TABLE.get(tokens[start..].join(" ").as_str()).copied())
}

/// Supplies display values for fields. `None` leaves the marker untouched.
pub trait FieldSource {
    fn value(&self, field: Field) -> Option<String>;
}

impl FieldSource for HashMap<Field, String> {
    fn value(&self, field: Field) -> Option<String> {
        self.get(&field).cloned()
    }
}

/// Byte ranges of the two team sections of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    /// Team A covers `0..boundary`
    pub boundary: usize,
    /// Team B covers `boundary..end`; text after `end` belongs to neither
    pub end: usize,
}

impl Sections {
    /// The first `<hr>` sits under the header, so with two or more the second
    /// one starts team B. A single `<hr>` is the split itself. With none the
    /// whole text is team A.
    pub fn locate(text: &str) -> Self {
        let hrs: Vec<usize> = HR.find_iter(text).map(|m| m.start()).collect();
        let split = match hrs.len() {
            0 => return Sections { boundary: text.len(), end: text.len() },
            1 => 0,
            _ => 1,
        };
        Sections {
            boundary: hrs[split],
            end: hrs.get(split + 1).copied().unwrap_or(text.len()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    pub replaced: Vec<String>,
    /// Known tags whose field had no data
    pub skipped: Vec<String>,
    pub unknown: Vec<String>,
    /// Markers after team B's section
    pub out_of_scope: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Substitution {
    pub text: String,
    pub report: SubstitutionReport,
}

struct Edit {
    start: usize,
    end: usize,
    value: String,
}

/// Whether `pos` falls inside an HTML tag (after a `<` with no closing `>` yet).
fn inside_tag(text: &str, pos: usize) -> bool {
    let before = &text[..pos];
    match (before.rfind('<'), before.rfind('>')) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

/// For a marker inside an opening tag, the byte range of that element's content
/// with leading and trailing whitespace excluded.
fn element_content(text: &str, marker_start: usize, marker_end: usize) -> Option<(usize, usize)> {
    let tag_start = text[..marker_start].rfind('<')?;
    let name: String = text[tag_start + 1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if name.is_empty() {
        return None;
    }
    let open_end = marker_end + text[marker_end..].find('>')? + 1;
    let close = format!("</{}", name.to_ascii_lowercase());
    let close_at = open_end + text[open_end..].to_ascii_lowercase().find(&close)?;

    let inner = &text[open_end..close_at];
    let lead = inner.len() - inner.trim_start().len();
    let trail = inner.len() - inner.trim_end().len();
    if lead == inner.len() {
        // Blank element: keep the whitespace, value goes right before the close tag
        return Some((close_at, close_at));
    }
    Some((open_end + lead, close_at - trail))
}

/// Replace every marker in `text`.
///
/// With `second` set, markers are scoped by [`Sections`]: team A's source
/// fills markers before the boundary, team B's the ones up to the next
/// separator. Without it, every marker is filled from `first`.
pub fn substitute(
    text: &str,
    first: &dyn FieldSource,
    second: Option<&dyn FieldSource>,
) -> Substitution {
    let sections = Sections::locate(text);
    let mut report = SubstitutionReport::default();
    let mut edits: Vec<Edit> = Vec::new();

    for caps in MARKER.captures_iter(text) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let tag_text = tag.as_str().trim().to_string();
        let Some(field) = field_for_tag(&tag_text) else {
            report.unknown.push(tag_text);
            continue;
        };

        let source = match second {
            Some(_) if whole.start() >= sections.end => {
                report.out_of_scope.push(tag_text);
                continue;
            }
            Some(b) if whole.start() >= sections.boundary => b,
            _ => first,
        };

        let Some(value) = source.value(field) else {
            report.skipped.push(tag_text);
            continue;
        };

        let (start, end) = if inside_tag(text, whole.start()) {
            match element_content(text, whole.start(), whole.end()) {
                Some(range) => range,
                None => {
                    report.skipped.push(tag_text);
                    continue;
                }
            }
        } else {
            (whole.start(), whole.end())
        };

        if edits.last().is_some_and(|prev| start < prev.end) {
            report.skipped.push(tag_text);
            continue;
        }
        edits.push(Edit { start, end, value });
        report.replaced.push(tag_text);
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in edits {
        out.push_str(&text[cursor..edit.start]);
        out.push_str(&edit.value);
        cursor = edit.end;
    }
    out.push_str(&text[cursor..]);

    Substitution { text: out, report }
}

/// Read a template as UTF-8, dropping a leading byte order mark.
pub fn read_template(path: &Path) -> Result<String, GdtError> {
    let bytes = fs::read(path).map_err(|e| GdtError::Template {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let text = String::from_utf8(bytes).map_err(|e| GdtError::Template {
        path: path.to_path_buf(),
        message: format!("not valid UTF-8: {}", e),
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(Field, &str)]) -> HashMap<Field, String> {
        pairs.iter().map(|(f, v)| (*f, v.to_string())).collect()
    }

    #[test]
    fn test_field_for_tag() {
        assert_eq!(field_for_tag("RECORD"), Some(Field::Record));
        assert_eq!(field_for_tag("NYR RECORD"), Some(Field::Record));
        assert_eq!(field_for_tag("RECORD HOME"), Some(Field::HomeRecord));
        assert_eq!(field_for_tag("NYR  record   home"), Some(Field::HomeRecord));
        assert_eq!(field_for_tag("TOI/G (D)"), Some(Field::DefenseToiLeader));
        assert_eq!(field_for_tag("OPP +/-"), Some(Field::PlusMinusLeader));
        assert_eq!(field_for_tag("GOAL DIFF"), Some(Field::GoalDiff));
        assert_eq!(field_for_tag("WEATHER"), None);
    }

    #[test]
    fn test_every_marker_tag_resolves_to_its_field() {
        for (tag, field) in MARKERS {
            assert_eq!(field_for_tag(tag), Some(*field), "{}", tag);
        }
    }

    #[test]
    fn test_bare_marker_is_consumed() {
        let out = substitute(
            "Record: ***UPDATE RECORD***",
            &source(&[(Field::Record, "10-5-2")]),
            None,
        );
        assert_eq!(out.text, "Record: 10-5-2");
        assert_eq!(out.report.replaced, vec!["RECORD"]);
    }

    #[test]
    fn test_attribute_marker_replaces_content() {
        let text = "<td>\n\t<p data-gdt=\"***UPDATE RECORD***\">\n\t\t9-5-2 (<b>20 Points</b>)\n\t</p>\n</td>";
        let src = source(&[(Field::Record, "10-5-2 (<b>22 Points</b>)")]);
        let out = substitute(text, &src, None);
        assert_eq!(
            out.text,
            "<td>\n\t<p data-gdt=\"***UPDATE RECORD***\">\n\t\t10-5-2 (<b>22 Points</b>)\n\t</p>\n</td>"
        );
        // Marker survives, so the next run lands in the same place
        let again = substitute(&out.text, &src, None);
        assert_eq!(again.text, out.text);
    }

    #[test]
    fn test_empty_element() {
        let out = substitute(
            "<p data-gdt=\"***UPDATE ROW***\"></p>",
            &source(&[(Field::RegulationOtWins, "9")]),
            None,
        );
        assert_eq!(out.text, "<p data-gdt=\"***UPDATE ROW***\">9</p>");
    }

    #[test]
    fn test_unknown_and_missing_are_left_alone() {
        let text = "<p>***UPDATE WEATHER***</p><p>***UPDATE SV%***</p><p>***UPDATE ROW***</p>";
        let out = substitute(text, &source(&[(Field::RegulationOtWins, "9")]), None);
        assert_eq!(
            out.text,
            "<p>***UPDATE WEATHER***</p><p>***UPDATE SV%***</p><p>9</p>"
        );
        assert_eq!(out.report.unknown, vec!["WEATHER"]);
        assert_eq!(out.report.skipped, vec!["SV%"]);
    }

    #[test]
    fn test_sections() {
        assert_eq!(
            Sections::locate("abc"),
            Sections { boundary: 3, end: 3 }
        );
        let one = "A<hr>B";
        assert_eq!(Sections::locate(one), Sections { boundary: 1, end: 6 });
        let three = "H<hr style=\"width:50%\">A<HR>B<hr>F";
        let s = Sections::locate(three);
        assert_eq!(&three[..s.boundary], "H<hr style=\"width:50%\">A");
        assert_eq!(&three[s.boundary..s.end], "<HR>B");
    }

    #[test]
    fn test_two_team_scoping() {
        let text = "<hr>***UPDATE NYR RECORD***<hr>***UPDATE NYR RECORD***";
        let a = source(&[(Field::Record, "10-5-2")]);
        let b = source(&[(Field::Record, "8-7-1")]);
        let out = substitute(text, &a, Some(&b));
        assert_eq!(out.text, "<hr>10-5-2<hr>8-7-1");
    }

    #[test]
    fn test_footer_after_second_section_untouched() {
        let text = "<hr>***UPDATE RECORD***<hr>***UPDATE RECORD***<hr>***UPDATE RECORD***";
        let a = source(&[(Field::Record, "A")]);
        let b = source(&[(Field::Record, "B")]);
        let out = substitute(text, &a, Some(&b));
        assert_eq!(out.text, "<hr>A<hr>B<hr>***UPDATE RECORD***");
        assert_eq!(out.report.out_of_scope, vec!["RECORD"]);

        // Single-team runs ignore separators entirely
        let single = substitute(text, &a, None);
        assert_eq!(single.text, "<hr>A<hr>A<hr>A");
    }

    #[test]
    fn test_no_markers_is_identity() {
        let text = "<html><body><p>No markers here</p><hr></body></html>";
        let out = substitute(text, &source(&[(Field::Record, "1-2-3")]), None);
        assert_eq!(out.text, text);
        assert!(out.report.replaced.is_empty());
    }

    #[test]
    fn test_read_template_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gdt.html");
        fs::write(&path, "\u{feff}<p>***UPDATE RECORD***</p>").unwrap();
        assert_eq!(read_template(&path).unwrap(), "<p>***UPDATE RECORD***</p>");
    }

    #[test]
    fn test_read_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        match read_template(&dir.path().join("missing.html")) {
            Err(GdtError::Template { .. }) => {}
            other => panic!("expected template error, got {:?}", other),
        }
    }
}
