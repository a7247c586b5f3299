//! Report aggregation over a run's accumulated test results.
//!
//! Produces summary counts, a per-method breakdown, and a short list of
//! heuristic recommendations; serializes to the persisted `test-report.json`.

use crate::validator::{Method, TestResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-line counts for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total results judged.
    pub total: usize,
    /// Results that passed.
    pub passed: usize,
    /// Results that failed.
    pub failed: usize,
    /// `passed / total`, 0 when no results exist.
    pub pass_rate: f64,
}

/// Per-method counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodBreakdown {
    /// Results for this method.
    pub total: usize,
    /// Passing results for this method.
    pub passed: usize,
    /// Failing results for this method.
    pub failed: usize,
}

/// Derived, read-only view over the accumulated result sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Top-line counts.
    pub summary: ReportSummary,
    /// Counts keyed by method wire name.
    pub by_method: BTreeMap<String, MethodBreakdown>,
    /// The full result sequence, in execution order.
    pub tests: Vec<TestResult>,
    /// Heuristic recommendations, deterministic and order-preserving.
    pub recommendations: Vec<String>,
}

/// Fold the run-scoped result sequence into a report.
pub fn generate_report(results: &[TestResult]) -> Report {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = total - passed;
    let pass_rate = if total > 0 {
        passed as f64 / total as f64
    } else {
        0.0
    };

    let mut by_method: BTreeMap<String, MethodBreakdown> = BTreeMap::new();
    for result in results {
        let entry = by_method.entry(result.method.to_string()).or_default();
        entry.total += 1;
        if result.passed {
            entry.passed += 1;
        } else {
            entry.failed += 1;
        }
    }

    let mut recommendations = Vec::new();
    if let Some(ai) = by_method.get(Method::Ai.as_str()) {
        if ai.failed > ai.passed {
            recommendations.push(
                "AI vectorization is failing more often than passing; review the AI engine configuration".to_string(),
            );
        }
    }
    if let Some(tracer) = by_method.get(Method::FallbackTracer.as_str()) {
        if tracer.failed > tracer.passed {
            recommendations.push(
                "Fallback tracer is failing more often than passing; tune its tracing thresholds"
                    .to_string(),
            );
        }
    }

    Report {
        summary: ReportSummary {
            total,
            passed,
            failed,
            pass_rate,
        },
        by_method,
        tests: results.to_vec(),
        recommendations,
    }
}

/// Render a report as a terminal summary.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("══════════════════════════════════════════════════\n");
    out.push_str("  VECTORIZATION QUALITY REPORT\n");
    out.push_str("══════════════════════════════════════════════════\n");
    out.push_str(&format!(
        "  Total: {}  Passed: {}  Failed: {}  ({:.1}%)\n",
        report.summary.total,
        report.summary.passed,
        report.summary.failed,
        report.summary.pass_rate * 100.0
    ));

    for (method, counts) in &report.by_method {
        out.push_str(&format!(
            "  {method:<16} {}/{} passed\n",
            counts.passed, counts.total
        ));
    }

    for test in &report.tests {
        let mark = if test.passed { "✓" } else { "✗" };
        out.push_str(&format!(
            "  [{mark}] {} ({}, {})\n",
            test.test_name, test.method, test.edge_case
        ));
        for issue in &test.issues {
            out.push_str(&format!("      └─ {issue}\n"));
        }
    }

    if !report.recommendations.is_empty() {
        out.push_str("\n  Recommendations:\n");
        for rec in &report.recommendations {
            out.push_str(&format!("  • {rec}\n"));
        }
    }

    out
}

/// Serialize a report to pretty-printed JSON at `path`.
pub fn write_json(report: &Report, path: &Path) -> Result<(), std::io::Error> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, json)
}
