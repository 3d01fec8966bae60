//! # Quality Assessment
//!
//! Scores a generated puzzle against fixed thresholds.
//!
//! ## Gates
//!
//! | Check | Bound |
//! |-------|-------|
//! | solvability score | `>= 0.75` |
//! | clarity | `>= 0.70` |
//! | engagement potential | `>= 0.65` |
//! | complexity | `0.15 ..= 0.95` |
//! | overall score | `>= 0.75` |
//!
//! A puzzle that misses a gate is reported, not rejected here. The caller
//! decides whether to regenerate.

use std::fmt::Write as _;
use std::time::Instant;

use puzzleforge_core::{GeneratedPuzzle, PuzzleType, QualityMetrics};
use serde::Serialize;

/// Hard quality thresholds (engine constants).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QualityThresholds {
    /// Minimum solvability score.
    pub min_solvability: f64,
    /// Minimum clarity.
    pub min_clarity: f64,
    /// Minimum engagement potential.
    pub min_engagement: f64,
    /// Minimum complexity.
    pub min_complexity: f64,
    /// Maximum complexity.
    pub max_complexity: f64,
    /// Minimum overall score to pass.
    pub min_overall: f64,
}

impl QualityThresholds {
    /// The engine's fixed thresholds.
    pub const STANDARD: Self = Self {
        min_solvability: 0.75,
        min_clarity: 0.70,
        min_engagement: 0.65,
        min_complexity: 0.15,
        max_complexity: 0.95,
        min_overall: 0.75,
    };
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Clarity below which engagement is zero regardless of other metrics.
pub const MIN_ENGAGING_CLARITY: f64 = 0.6;

/// Pass mark for the engagement step of the validation pipeline.
pub const ENGAGEMENT_PASS: f64 = 0.6;

/// Pass mark for the educational-value step.
pub const EDUCATIONAL_PASS: f64 = 0.6;

/// Pass mark for the solvability step.
pub const SOLVABILITY_PASS: f64 = 0.7;

/// Result of `QualityAssessor::assess`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// Mean of solvability, clarity, engagement and complexity, in `[0, 1]`.
    pub overall_score: f64,
    /// The metrics that were scored.
    pub metrics_breakdown: QualityMetrics,
    /// One entry per missed threshold.
    pub issues: Vec<String>,
    /// One recommendation per issue.
    pub recommendations: Vec<String>,
    /// No issues and overall score at or above the pass mark.
    pub passes_standards: bool,
}

impl QualityReport {
    /// True when complexity fell below its minimum.
    #[must_use]
    pub fn complexity_too_low(&self) -> bool {
        self.metrics_breakdown.complexity < QualityThresholds::STANDARD.min_complexity
    }

    /// True when complexity rose above its maximum.
    #[must_use]
    pub fn complexity_too_high(&self) -> bool {
        self.metrics_breakdown.complexity > QualityThresholds::STANDARD.max_complexity
    }
}

/// Weighted engagement factors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct EngagementFactors {
    /// Clarity (weight 0.40).
    pub clarity: f64,
    /// `min(1, uniqueness + 0.2)` (weight 0.25).
    pub novelty: f64,
    /// Complexity (weight 0.25).
    pub challenge: f64,
    /// 0.8 with hints, 0.5 without (weight 0.10).
    pub feedback: f64,
}

/// Result of `QualityAssessor::validate_engagement`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementReport {
    /// Weighted engagement score in `[0, 1]`.
    pub engagement_score: f64,
    /// Individual factors.
    pub factors: EngagementFactors,
    /// Blocking issue (unclear) or challenge warnings.
    pub issues: Vec<String>,
}

/// Result of `QualityAssessor::validate_educational_value`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationalReport {
    /// `max(0, 0.8 - 0.2 * issues)`.
    pub score: f64,
    /// Skills this puzzle type trains.
    pub skills_developed: Vec<String>,
    /// Learning outcomes.
    pub learning_outcomes: Vec<String>,
    /// Missing explanation / hints.
    pub issues: Vec<String>,
}

/// One named step of the comprehensive validation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStep {
    /// Step name.
    pub name: String,
    /// Whether the step passed.
    pub passed: bool,
    /// Detail or score summary.
    pub message: String,
    /// Elapsed time since the pipeline started (µs).
    pub duration_us: u64,
}

/// Result of `QualityAssessor::perform_comprehensive_validation`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveValidation {
    /// Ordered pipeline steps.
    pub steps: Vec<ValidationStep>,
    /// Every step passed.
    pub passed: bool,
    /// Fraction of steps that passed.
    pub total_score: f64,
    /// Human-readable report.
    pub report: String,
}

/// Stateless quality scorer.
#[derive(Clone, Copy, Debug, Default)]
pub struct QualityAssessor {
    thresholds: QualityThresholds,
}

impl QualityAssessor {
    /// Creates an assessor with the standard thresholds.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            thresholds: QualityThresholds::STANDARD,
        }
    }

    /// The thresholds in use.
    #[must_use]
    pub const fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Scores a puzzle against the thresholds.
    #[must_use]
    pub fn assess(&self, puzzle: &GeneratedPuzzle) -> QualityReport {
        let t = &self.thresholds;
        let metrics = *puzzle.metrics();
        let solvability = puzzle.metadata.solvability_score;
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        if solvability < t.min_solvability {
            issues.push(format!("Solvability {solvability:.2} below threshold"));
            recommendations.push("Simplify puzzle constraints or add more hint options".to_string());
        }
        if metrics.clarity < t.min_clarity {
            issues.push(format!("Clarity {:.2} below threshold", metrics.clarity));
            recommendations.push("Improve puzzle description and make instructions clearer".to_string());
        }
        if metrics.engagement_potential < t.min_engagement {
            issues.push(format!(
                "Engagement {:.2} below threshold",
                metrics.engagement_potential
            ));
            recommendations.push("Add more interesting puzzle variations or twists".to_string());
        }
        if metrics.complexity < t.min_complexity {
            issues.push(format!("Complexity {:.2} below threshold", metrics.complexity));
            recommendations.push("Increase constraints or puzzle difficulty".to_string());
        }
        if metrics.complexity > t.max_complexity {
            issues.push(format!("Complexity {:.2} exceeds maximum", metrics.complexity));
            recommendations.push("Reduce constraints or simplify the problem space".to_string());
        }

        let overall_score = ((solvability
            + metrics.clarity
            + metrics.engagement_potential
            + metrics.complexity)
            / 4.0)
            .clamp(0.0, 1.0);

        QualityReport {
            overall_score,
            metrics_breakdown: metrics,
            passes_standards: issues.is_empty() && overall_score >= t.min_overall,
            issues,
            recommendations,
        }
    }

    /// Estimates player engagement.
    ///
    /// Clarity below `MIN_ENGAGING_CLARITY` short-circuits to zero with a
    /// blocking issue.
    #[must_use]
    pub fn validate_engagement(&self, puzzle: &GeneratedPuzzle) -> EngagementReport {
        let metrics = puzzle.metrics();

        if metrics.clarity < MIN_ENGAGING_CLARITY {
            return EngagementReport {
                engagement_score: 0.0,
                factors: EngagementFactors::default(),
                issues: vec!["Puzzle instructions are unclear - players will be confused".to_string()],
            };
        }

        let factors = EngagementFactors {
            clarity: metrics.clarity,
            novelty: (metrics.uniqueness + 0.2).min(1.0),
            challenge: metrics.complexity,
            feedback: if puzzle.hints.is_empty() { 0.5 } else { 0.8 },
        };

        let mut issues = Vec::new();
        if factors.challenge < 0.2 {
            issues.push("Puzzle too easy - may not engage players".to_string());
        }
        if factors.challenge > 0.85 {
            issues.push("Puzzle too difficult - may frustrate players".to_string());
        }

        let score = factors.clarity * 0.4
            + factors.novelty * 0.25
            + factors.challenge * 0.25
            + factors.feedback * 0.1;

        EngagementReport {
            engagement_score: score.min(1.0),
            factors,
            issues,
        }
    }

    /// Scores how much a puzzle teaches.
    #[must_use]
    pub fn validate_educational_value(&self, puzzle: &GeneratedPuzzle) -> EducationalReport {
        let mut issues = Vec::new();
        if puzzle.solution.explanation.trim().is_empty() {
            issues.push("No solution explanation for learning".to_string());
        }
        if puzzle.hints.is_empty() {
            issues.push("No hints for guided learning".to_string());
        }

        let score = (0.8 - 0.2 * issues.len() as f64).max(0.0);

        EducationalReport {
            score,
            skills_developed: skills_for(puzzle.puzzle_type)
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            learning_outcomes: vec![
                format!("Understanding {} challenges", puzzle.puzzle_type),
                "Developing systematic problem-solving approach".to_string(),
                "Building confidence in puzzle solving".to_string(),
            ],
            issues,
        }
    }

    /// Runs the full validation pipeline.
    ///
    /// Steps, in order: structure, content, solvability, quality,
    /// engagement, educational value.
    #[must_use]
    pub fn perform_comprehensive_validation(&self, puzzle: &GeneratedPuzzle) -> ComprehensiveValidation {
        let start = Instant::now();
        let mut steps = Vec::with_capacity(6);
        let mut push = |name: &str, passed: bool, message: String| {
            steps.push(ValidationStep {
                name: name.to_string(),
                passed,
                message,
                duration_us: u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            });
        };

        let structure = validate_structure(puzzle);
        push(
            "Structure Validation",
            structure.is_empty(),
            joined_or(&structure, "Valid puzzle structure"),
        );

        let content = validate_content(puzzle);
        push(
            "Content Validation",
            content.is_empty(),
            joined_or(&content, "Valid content"),
        );

        let solvability = puzzle.metadata.solvability_score;
        push(
            "Solvability Validation",
            solvability >= SOLVABILITY_PASS,
            format!("Solvability score: {solvability:.2}"),
        );

        let quality = self.assess(puzzle);
        push(
            "Quality Assessment",
            quality.passes_standards,
            format!("Overall score: {:.2}", quality.overall_score),
        );

        let engagement = self.validate_engagement(puzzle);
        push(
            "Engagement Validation",
            engagement.engagement_score >= ENGAGEMENT_PASS,
            format!("Engagement score: {:.2}", engagement.engagement_score),
        );

        let educational = self.validate_educational_value(puzzle);
        push(
            "Educational Value",
            educational.score >= EDUCATIONAL_PASS,
            format!("Educational score: {:.2}", educational.score),
        );

        let passed_count = steps.iter().filter(|s| s.passed).count();
        let total_score = passed_count as f64 / steps.len() as f64;
        let passed = passed_count == steps.len();
        let report = render_report(&steps, &quality, &engagement);

        ComprehensiveValidation {
            steps,
            passed,
            total_score,
            report,
        }
    }
}

/// Skill taxonomy per puzzle type.
#[must_use]
pub const fn skills_for(puzzle_type: PuzzleType) -> &'static [&'static str] {
    match puzzle_type {
        PuzzleType::Logic => &["Logical reasoning", "Critical thinking", "Problem decomposition"],
        PuzzleType::Pattern => &["Pattern recognition", "Analytical thinking", "Inductive reasoning"],
        PuzzleType::Math => &["Mathematical thinking", "Calculation", "Numerical reasoning"],
        PuzzleType::Word => &["Linguistic skills", "Vocabulary", "Language comprehension"],
        PuzzleType::Visual => &["Spatial reasoning", "Visual analysis", "Pattern matching"],
    }
}

fn validate_structure(puzzle: &GeneratedPuzzle) -> Vec<String> {
    let mut errors = Vec::new();
    if puzzle.id.trim().is_empty() {
        errors.push("Missing puzzle ID".to_string());
    }
    if puzzle.title.trim().chars().count() < 5 {
        errors.push("Title too short or missing".to_string());
    }
    if puzzle.description.trim().is_empty() {
        errors.push("Missing description".to_string());
    }
    if puzzle.content.puzzle_type() != puzzle.puzzle_type {
        errors.push("Content does not match puzzle type".to_string());
    }
    if puzzle.solution.answer.is_empty() {
        errors.push("Solution answer missing".to_string());
    }
    if puzzle.hints.is_empty() {
        errors.push("No hints provided".to_string());
    }
    if puzzle.time_limit == 0 {
        errors.push("Invalid time limit".to_string());
    }
    if puzzle.base_points == 0 {
        errors.push("Invalid point value".to_string());
    }
    errors
}

fn validate_content(puzzle: &GeneratedPuzzle) -> Vec<String> {
    let mut errors = Vec::new();
    if puzzle.content.is_empty() {
        errors.push("Puzzle content is empty".to_string());
    }
    let short_hints = puzzle
        .hints
        .iter()
        .filter(|h| h.trim().chars().count() < 5)
        .count();
    if short_hints > 0 {
        errors.push(format!("{short_hints} invalid hints detected"));
    }
    if puzzle.solution.explanation.trim().chars().count() < 10 {
        errors.push("Solution explanation insufficient".to_string());
    }
    errors
}

fn joined_or(errors: &[String], ok: &str) -> String {
    if errors.is_empty() {
        ok.to_string()
    } else {
        errors.join("; ")
    }
}

/// Renders the human-readable validation report.
#[must_use]
pub fn render_report(
    steps: &[ValidationStep],
    quality: &QualityReport,
    engagement: &EngagementReport,
) -> String {
    let mut report = String::from("=== PUZZLE VALIDATION REPORT ===\n\nVALIDATION STEPS:\n");

    for step in steps {
        let _ = writeln!(
            report,
            "  {} {}: {} ({}us)",
            if step.passed { "+" } else { "x" },
            step.name,
            if step.passed { "PASSED" } else { "FAILED" },
            step.duration_us
        );
        let _ = writeln!(report, "    -> {}", step.message);
    }

    let _ = writeln!(report, "\nQUALITY METRICS:");
    let _ = writeln!(report, "  Overall Score: {:.2}", quality.overall_score);
    let _ = writeln!(
        report,
        "  Passes Standards: {}",
        if quality.passes_standards { "YES" } else { "NO" }
    );

    if !quality.issues.is_empty() {
        let _ = writeln!(report, "\nISSUES FOUND:");
        for issue in &quality.issues {
            let _ = writeln!(report, "  ! {issue}");
        }
    }
    if !quality.recommendations.is_empty() {
        let _ = writeln!(report, "\nRECOMMENDATIONS:");
        for rec in &quality.recommendations {
            let _ = writeln!(report, "  -> {rec}");
        }
    }

    let _ = writeln!(report, "\nENGAGEMENT ANALYSIS:");
    let _ = writeln!(report, "  Engagement Score: {:.2}", engagement.engagement_score);
    let _ = writeln!(report, "  Clarity: {:.2}", engagement.factors.clarity);
    let _ = writeln!(report, "  Novelty: {:.2}", engagement.factors.novelty);
    let _ = writeln!(report, "  Challenge: {:.2}", engagement.factors.challenge);

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_puzzle;

    #[test]
    fn test_good_puzzle_passes() {
        let puzzle = sample_puzzle("p-1", 1);
        let report = QualityAssessor::new().assess(&puzzle);
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert!(report.passes_standards);
        assert!(report.overall_score >= 0.75);
    }

    #[test]
    fn test_each_threshold_adds_issue_and_recommendation() {
        let mut puzzle = sample_puzzle("p-1", 1);
        puzzle.metadata.solvability_score = 0.5;
        puzzle.metadata.quality_metrics.clarity = 0.65;
        puzzle.metadata.quality_metrics.engagement_potential = 0.3;
        puzzle.metadata.quality_metrics.complexity = 0.1;

        let report = QualityAssessor::new().assess(&puzzle);
        assert_eq!(report.issues.len(), 4);
        assert_eq!(report.recommendations.len(), 4);
        assert!(!report.passes_standards);
        assert!(report.complexity_too_low());
        assert!(report.recommendations.iter().any(|r| r.contains("Increase constraints")));
    }

    #[test]
    fn test_complexity_above_max() {
        let mut puzzle = sample_puzzle("p-1", 1);
        puzzle.metadata.quality_metrics.complexity = 0.99;
        let report = QualityAssessor::new().assess(&puzzle);
        assert!(report.complexity_too_high());
        assert!(report.recommendations.iter().any(|r| r.contains("Reduce constraints")));
        assert!(!report.passes_standards);
    }

    #[test]
    fn test_no_issues_but_low_overall_fails() {
        let mut puzzle = sample_puzzle("p-1", 1);
        puzzle.metadata.solvability_score = 0.76;
        puzzle.metadata.quality_metrics.clarity = 0.71;
        puzzle.metadata.quality_metrics.engagement_potential = 0.66;
        puzzle.metadata.quality_metrics.complexity = 0.2;

        let report = QualityAssessor::new().assess(&puzzle);
        assert!(report.issues.is_empty());
        assert!(report.overall_score < 0.75);
        assert!(!report.passes_standards);
    }

    #[test]
    fn test_unclear_puzzle_has_zero_engagement() {
        let mut puzzle = sample_puzzle("p-1", 1);
        puzzle.metadata.quality_metrics.clarity = 0.5;

        let report = QualityAssessor::new().validate_engagement(&puzzle);
        assert!(report.engagement_score.abs() < f64::EPSILON);
        assert!(!report.issues.is_empty());
    }

    #[test]
    fn test_engagement_weights() {
        let mut puzzle = sample_puzzle("p-1", 1);
        let metrics = &mut puzzle.metadata.quality_metrics;
        metrics.clarity = 0.8;
        metrics.uniqueness = 0.5;
        metrics.complexity = 0.4;

        let report = QualityAssessor::new().validate_engagement(&puzzle);
        let expected = 0.8 * 0.4 + 0.7 * 0.25 + 0.4 * 0.25 + 0.8 * 0.1;
        assert!((report.engagement_score - expected).abs() < 1e-9);

        puzzle.hints.clear();
        let report = QualityAssessor::new().validate_engagement(&puzzle);
        assert!((report.factors.feedback - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_educational_value_penalises_missing_parts() {
        let mut puzzle = sample_puzzle("p-1", 1);
        let assessor = QualityAssessor::new();
        assert!((assessor.validate_educational_value(&puzzle).score - 0.8).abs() < 1e-9);

        puzzle.hints.clear();
        puzzle.solution.explanation.clear();
        let report = assessor.validate_educational_value(&puzzle);
        assert_eq!(report.issues.len(), 2);
        assert!((report.score - 0.4).abs() < 1e-9);
        assert_eq!(report.skills_developed.len(), 3);
    }

    #[test]
    fn test_comprehensive_pipeline() {
        let puzzle = sample_puzzle("p-1", 1);
        let result = QualityAssessor::new().perform_comprehensive_validation(&puzzle);
        assert_eq!(result.steps.len(), 6);
        assert!(result.passed, "{}", result.report);
        assert!((result.total_score - 1.0).abs() < f64::EPSILON);
        assert!(result.report.contains("PUZZLE VALIDATION REPORT"));
    }

    #[test]
    fn test_comprehensive_pipeline_partial_score() {
        let mut puzzle = sample_puzzle("p-1", 1);
        puzzle.hints = vec!["hi".to_string()];
        puzzle.metadata.solvability_score = 0.6;

        let result = QualityAssessor::new().perform_comprehensive_validation(&puzzle);
        assert!(!result.passed);
        let failed: Vec<_> = result.steps.iter().filter(|s| !s.passed).map(|s| s.name.as_str()).collect();
        assert!(failed.contains(&"Content Validation"));
        assert!(failed.contains(&"Solvability Validation"));
        assert!(result.total_score < 1.0);
    }
}
