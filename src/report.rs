//! Search reports.
//!
//! A report is markdown for people with one fenced `json` block per
//! line for tools. Each block carries the terminal snapshot (full
//! records, loadable with `GameState::from_snapshot`), the card names
//! per zone, the achieved buckets and the rank key. `parse_blocks`
//! reads the blocks back.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{GameState, Snapshot, Zone};
use crate::eval::{Achieved, RankKey};
use crate::search::{RankedLine, SearchStats};

/// Directory reports go to when no output path is given.
pub const REPORT_DIR: &str = "reports";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid report block: {0}")]
    Json(#[from] serde_json::Error),
}

/// Card names by zone. `field` lists every field slot group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneNames {
    pub field: Vec<String>,
    pub hand: Vec<String>,
    pub gy: Vec<String>,
    pub banished: Vec<String>,
    pub extra: Vec<String>,
    pub deck: Vec<String>,
}

impl ZoneNames {
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        let names = |zones: &[Zone]| -> Vec<String> {
            zones
                .iter()
                .flat_map(|&z| state.cards_in(z))
                .map(|(_, card)| card.name.clone())
                .collect()
        };
        Self {
            field: names(&Zone::FIELD),
            hand: names(&[Zone::Hand]),
            gy: names(&[Zone::Gy]),
            banished: names(&[Zone::Banished]),
            extra: names(&[Zone::Extra]),
            deck: names(&[Zone::Deck]),
        }
    }
}

/// Machine-readable part of one reported line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineData {
    /// 1-based index of the hand the line starts from.
    pub hand: usize,
    pub rank_key: RankKey,
    pub achieved: Vec<Achieved>,
    pub summary: String,
    pub zones: ZoneNames,
    pub snapshot: Snapshot,
}

#[derive(Clone, Debug)]
pub struct ReportLine {
    pub actions: Vec<String>,
    pub data: LineData,
}

impl From<&RankedLine> for ReportLine {
    fn from(ranked: &RankedLine) -> Self {
        let line = &ranked.line;
        Self {
            actions: line.actions.iter().map(|r| r.description.clone()).collect(),
            data: LineData {
                hand: ranked.root + 1,
                rank_key: line.evaluation.rank_key,
                achieved: line.evaluation.achieved.clone(),
                summary: line.evaluation.summary.clone(),
                zones: ZoneNames::from_state(&line.state),
                snapshot: line.state.to_snapshot(),
            },
        }
    }
}

/// A full search report.
#[derive(Clone, Debug)]
pub struct Report {
    pub title: String,
    pub hands: usize,
    pub stats: SearchStats,
    pub lines: Vec<ReportLine>,
}

impl Report {
    /// Build from merged results (best first).
    #[must_use]
    pub fn new(title: impl Into<String>, hands: usize, lines: &[RankedLine], stats: SearchStats) -> Self {
        Self {
            title: title.into(),
            hands,
            stats,
            lines: lines.iter().map(ReportLine::from).collect(),
        }
    }

    #[must_use]
    pub fn best(&self) -> Option<&ReportLine> {
        self.lines.first()
    }

    /// Render as markdown.
    pub fn to_markdown(&self) -> Result<String, ReportError> {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "# Combo report: {}\n", self.title);
        let _ = writeln!(
            out,
            "Hands searched: {}. Expansions: {}. Terminal boards: {}. Stop: {:?}.\n",
            self.hands, self.stats.expansions, self.stats.terminals, self.stats.stop
        );

        if self.lines.is_empty() {
            out.push_str("No combo found.\n");
            return Ok(out);
        }

        for (i, line) in self.lines.iter().enumerate() {
            let _ = writeln!(out, "## Line {}: {}\n", i + 1, line.data.summary);
            let _ = writeln!(
                out,
                "Hand {}, {} actions, rank {}.\n",
                line.data.hand,
                line.actions.len(),
                line.data.rank_key
            );
            for (step, action) in line.actions.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", step + 1, action);
            }
            out.push('\n');
            let _ = writeln!(out, "```json\n{}\n```\n", serde_json::to_string_pretty(&line.data)?);
        }
        Ok(out)
    }

    /// Render and write to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        let io = |source: std::io::Error| ReportError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io)?;
        }
        std::fs::write(path, self.to_markdown()?).map_err(io)
    }
}

/// `reports/<scenario stem>.md`.
#[must_use]
pub fn default_path(scenario: &Path) -> PathBuf {
    let stem = scenario
        .file_stem()
        .map_or_else(|| "scenario".into(), |s| s.to_string_lossy().into_owned());
    Path::new(REPORT_DIR).join(format!("{stem}.md"))
}

/// Every fenced `json` block of a rendered report, in order.
pub fn parse_blocks(markdown: &str) -> Result<Vec<LineData>, ReportError> {
    let mut blocks = Vec::new();
    let mut rest = markdown;
    while let Some(start) = rest.find("```json\n") {
        let body = &rest[start + "```json\n".len()..];
        let Some(end) = body.find("\n```") else { break };
        blocks.push(serde_json::from_str(&body[..end])?);
        rest = &body[end + "\n```".len()..];
    }
    Ok(blocks)
}
