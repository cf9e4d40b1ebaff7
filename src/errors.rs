use std::path::PathBuf;
use thiserror::Error;

use crate::net::Source;

/// Pipeline stage an error belongs to, used for exit codes and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TeamResolution,
    Template,
    DataFetch,
    Output,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl Stage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::TeamResolution => "Team Resolution",
            Stage::Template => "Template",
            Stage::DataFetch => "Data Fetch",
            Stage::Output => "Output",
        }
    }

    /// Get actionable suggestion for fixing the issue at this stage
    pub fn suggestion(&self) -> &'static str {
        match self {
            Stage::TeamResolution => {
                "Use a full team name, city, nickname or 3-letter code (e.g. \"Devils\", \"NJD\")."
            }
            Stage::Template => "Check the template path and that the file is readable UTF-8.",
            Stage::DataFetch => {
                "The stats service did not answer. Check your connection or try again in a minute."
            }
            Stage::Output => "Check that the output directory exists and is writable.",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Stage::TeamResolution => 2,
            Stage::Template => 3,
            Stage::DataFetch => 4,
            Stage::Output => 5,
        }
    }
}

fn hint(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean {}?)", s))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum GdtError {
    /// Input did not match any franchise name, city, nickname or code
    #[error("unknown team '{input}'{}", hint(.suggestion))]
    UnknownTeam {
        input: String,
        suggestion: Option<String>,
    },

    #[error("{0} cannot play themselves")]
    SameTeam(String),

    /// A request failed after the retry budget, or its body could not be parsed
    #[error("{origin} request failed ({url}): {message}")]
    DataSource {
        origin: Source,
        url: String,
        message: String,
    },

    #[error("template {}: {message}", .path.display())]
    Template { path: PathBuf, message: String },

    #[error("could not write {}: {message}", .path.display())]
    Output { path: PathBuf, message: String },
}

impl GdtError {
    pub fn stage(&self) -> Stage {
        match self {
            GdtError::UnknownTeam { .. } | GdtError::SameTeam(_) => Stage::TeamResolution,
            GdtError::DataSource { .. } => Stage::DataFetch,
            GdtError::Template { .. } => Stage::Template,
            GdtError::Output { .. } => Stage::Output,
        }
    }

    /// Upstream source of a fetch failure
    pub fn origin(&self) -> Option<Source> {
        match self {
            GdtError::DataSource { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    pub fn data_source(origin: Source, url: &str, message: impl Into<String>) -> Self {
        GdtError::DataSource {
            origin,
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// Multi-line report for the terminal
    pub fn diagnostics(&self) -> String {
        let stage = self.stage();
        format!(
            "{} failed\nError: {}\nSuggestion: {}",
            stage.display_name(),
            self,
            stage.suggestion()
        )
    }
}
