use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evaluation::{EvaluationResult, TraitScore};

const BAR_WIDTH: usize = 20;

/// Outcome of the optional narrative step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NarrativeStatus {
    Generated { text: String },
    Unavailable { reason: String },
    Skipped,
}

impl NarrativeStatus {
    pub fn text(&self) -> Option<&str> {
        match self {
            NarrativeStatus::Generated { text } => Some(text),
            _ => None,
        }
    }
}

/// One bar of the sub-score chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub rating: i64,
    pub max_rating: i64,
    pub percent: f64,
}

impl From<&TraitScore> for ChartBar {
    fn from(score: &TraitScore) -> Self {
        Self {
            trait_name: score.trait_name.clone(),
            rating: score.rating,
            max_rating: score.max_rating,
            percent: score.percent,
        }
    }
}

/// Everything the presentation layer shows for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub student_name: String,
    pub program: String,
    pub generated_at: DateTime<Utc>,
    pub result: EvaluationResult,
    pub chart: Vec<ChartBar>,
    pub narrative: NarrativeStatus,
}

impl AssessmentReport {
    pub fn new(
        student_name: impl Into<String>,
        result: EvaluationResult,
        narrative: NarrativeStatus,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let chart = result.trait_scores.iter().map(ChartBar::from).collect();
        Self {
            student_name: student_name.into(),
            program: result.program.clone(),
            generated_at,
            result,
            chart,
            narrative,
        }
    }

    /// Plain-text document suitable for download or terminal output.
    pub fn render_text(&self) -> String {
        let result = &self.result;
        let mut out = String::new();

        let _ = writeln!(out, "Student Evaluation Report: {}", self.display_name());
        let _ = writeln!(out, "Program: {}", self.program);
        let _ = writeln!(
            out,
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        let _ = writeln!(
            out,
            "\nFit score: {:.2}% ({})",
            result.percentage,
            result.classification.label()
        );
        let _ = writeln!(
            out,
            "Verdict: {}",
            result.classification.summary(&result.program)
        );

        push_list(&mut out, "Strengths", &result.strengths);
        push_list(&mut out, "Weaknesses", &result.weaknesses);

        match &result.suggestion {
            Some(suggestion) => {
                let _ = writeln!(
                    out,
                    "\nSuggested alternative: {} ({})",
                    suggestion.program, suggestion.rationale
                );
            }
            None => {
                let _ = writeln!(out, "\nSuggested alternative: none");
            }
        }

        if !result.signals.is_empty() {
            let _ = writeln!(out, "\nObservations from written answers");
            for signal in &result.signals {
                let _ = writeln!(
                    out,
                    "- {}: {} (\"{}\")",
                    signal.trait_name, signal.note, signal.keyword
                );
            }
        }

        let _ = writeln!(out, "\nSub-scores");
        let label_width = self
            .chart
            .iter()
            .map(|bar| bar.trait_name.chars().count())
            .max()
            .unwrap_or(0);
        for bar in &self.chart {
            let _ = writeln!(
                out,
                "{:<label_width$} |{:<BAR_WIDTH$}| {}/{}",
                bar.trait_name,
                "#".repeat(bar_length(bar.percent)),
                bar.rating,
                bar.max_rating
            );
        }

        let _ = writeln!(out, "\nNarrative evaluation");
        match &self.narrative {
            NarrativeStatus::Generated { text } => {
                let _ = writeln!(out, "{text}");
            }
            NarrativeStatus::Unavailable { reason } => {
                let _ = writeln!(
                    out,
                    "Narrative evaluation unavailable: {reason}. The scores above are unaffected."
                );
            }
            NarrativeStatus::Skipped => {
                let _ = writeln!(out, "Not requested.");
            }
        }

        out
    }

    /// Chart data as CSV with a `trait,rating,max,percent` header.
    pub fn chart_csv(&self) -> Result<String, ReportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["trait", "rating", "max", "percent"])?;
        for bar in &self.chart {
            writer.write_record([
                bar.trait_name.clone(),
                bar.rating.to_string(),
                bar.max_rating.to_string(),
                format!("{:.2}", bar.percent),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ReportError::Io(err.into_error()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// `{name}_Evaluation_Report.txt` with characters outside `[A-Za-z0-9_-]` replaced.
    pub fn download_file_name(&self) -> String {
        let sanitized: String = self
            .student_name
            .trim()
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        let stem = if sanitized.is_empty() {
            "student"
        } else {
            sanitized.as_str()
        };
        format!("{stem}_Evaluation_Report.txt")
    }

    fn display_name(&self) -> &str {
        let trimmed = self.student_name.trim();
        if trimmed.is_empty() {
            "(unnamed student)"
        } else {
            trimmed
        }
    }
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        let _ = writeln!(out, "\n{heading}: none");
        return;
    }
    let _ = writeln!(out, "\n{heading}");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

fn bar_length(percent: f64) -> usize {
    let scaled = (percent.clamp(0.0, 100.0) / 100.0 * BAR_WIDTH as f64).round();
    scaled as usize
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to encode chart data: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush chart data: {0}")]
    Io(std::io::Error),
    #[error("chart data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
