//! Structural quality validation of vector output.
//!
//! The checks here are deliberately approximate: validity is "contains an
//! `<svg` root element anywhere in the text" and complexity is a literal
//! `<path` substring count. That looseness is load-bearing — a strict markup
//! parse would change pass/fail outcomes for malformed-but-accepted legacy
//! fixtures — so do not upgrade these heuristics to a real parser.

use serde::{Deserialize, Serialize};

/// Byte size above which output counts as having real content.
const MIN_CONTENT_BYTES: usize = 100;

/// Absolute byte floor below which a soft error is recorded.
const SIZE_FLOOR_BYTES: usize = 50;

// =============================================================================
// Vectorization methods
// =============================================================================

/// A vectorization method exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// Learned/AI tracer.
    #[serde(rename = "ai")]
    Ai,
    /// Deterministic fallback tracer.
    #[serde(rename = "fallback-tracer")]
    FallbackTracer,
}

impl Method {
    /// Wire name, as sent in the `method` multipart field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::FallbackTracer => "fallback-tracer",
        }
    }

    /// All known methods.
    pub fn all() -> Vec<Self> {
        vec![Self::Ai, Self::FallbackTracer]
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ai" => Ok(Self::Ai),
            "fallback-tracer" | "fallback" | "tracer" => Ok(Self::FallbackTracer),
            _ => Err(format!("Unknown vectorization method: {s}")),
        }
    }
}

// =============================================================================
// Complexity tiers
// =============================================================================

/// Coarse bucket of a vector output's path count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplexityTier {
    /// No paths at all.
    Empty,
    /// 1–10 paths.
    Simple,
    /// 11–100 paths.
    Moderate,
    /// 101–1000 paths.
    Complex,
    /// More than 1000 paths.
    VeryComplex,
}

impl ComplexityTier {
    /// Bucket a path count. Monotonic with boundaries at 0, 10, 100, 1000.
    pub fn from_path_count(count: usize) -> Self {
        match count {
            0 => Self::Empty,
            1..=10 => Self::Simple,
            11..=100 => Self::Moderate,
            101..=1000 => Self::Complex,
            _ => Self::VeryComplex,
        }
    }
}

impl std::fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
            Self::VeryComplex => "very-complex",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Quality profiles
// =============================================================================

/// Structural acceptance thresholds for one image category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityProfile {
    /// Minimum acceptable path count.
    pub min_paths: usize,
    /// Maximum acceptable path count.
    pub max_paths: usize,
    /// Minimum acceptable output size in bytes.
    pub min_file_size: usize,
    /// Human-readable category description.
    pub description: String,
}

impl QualityProfile {
    fn new(min_paths: usize, max_paths: usize, min_file_size: usize, description: &str) -> Self {
        Self {
            min_paths,
            max_paths,
            min_file_size,
            description: description.to_string(),
        }
    }
}

/// Resolve a named edge-case profile from the closed set.
///
/// Total: unrecognized names silently yield the permissive default profile,
/// so an unknown category weakens assurance instead of hard-failing the run.
/// A `warn` trace still flags the fallback in the run transcript.
pub fn resolve_profile(edge_case: &str) -> QualityProfile {
    match edge_case {
        "simple-logo" => QualityProfile::new(1, 50, 200, "Flat logo with few solid shapes"),
        "icon" => QualityProfile::new(1, 30, 300, "Small icon with a handful of paths"),
        "line-art" => QualityProfile::new(1, 100, 150, "Sparse line drawing"),
        "photograph" => QualityProfile::new(10, 10_000, 1000, "Dense photographic raster"),
        other => {
            tracing::warn!(edge_case = other, "unknown edge-case profile, using default");
            QualityProfile::new(1, 10_000, 100, "Permissive default profile")
        }
    }
}

// =============================================================================
// Validation metrics
// =============================================================================

/// Structural metrics computed from one vector output.
///
/// Derived purely from the output content; never persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Content contains a vector-markup root element somewhere.
    pub is_valid: bool,
    /// Byte size exceeds the minimal-content threshold.
    pub has_content: bool,
    /// At least one path-like element is present.
    pub has_paths: bool,
    /// Literal count of path-like elements.
    pub path_count: usize,
    /// Content declares a viewBox.
    pub has_view_box: bool,
    /// Byte size of the content in its canonical text encoding.
    pub file_size: usize,
    /// Coarse complexity bucket of `path_count`.
    pub complexity: ComplexityTier,
    /// Soft validation errors; folded into pass/fail, never thrown.
    pub errors: Vec<String>,
}

/// Validate vector output structurally.
///
/// Fails closed (records an error rather than raising) when the content is
/// empty or not textual. The `<svg` containment check is intentionally
/// lenient — not a strict prefix, not a full parse.
pub fn validate(content: &[u8]) -> ValidationMetrics {
    let mut errors = Vec::new();

    let text = match std::str::from_utf8(content) {
        Ok(text) => text,
        Err(_) => {
            errors.push("output is not valid UTF-8 text".to_string());
            ""
        }
    };
    if content.is_empty() {
        errors.push("output is empty".to_string());
    }

    let is_valid = text.contains("<svg");
    let path_count = text.matches("<path").count();
    let file_size = content.len();

    if file_size < SIZE_FLOOR_BYTES {
        errors.push(format!(
            "output size {file_size} bytes is below the {SIZE_FLOOR_BYTES}-byte floor"
        ));
    }
    if path_count == 0 {
        errors.push("no path elements found".to_string());
    }

    ValidationMetrics {
        is_valid,
        has_content: file_size > MIN_CONTENT_BYTES,
        has_paths: path_count > 0,
        path_count,
        has_view_box: text.contains("viewBox"),
        file_size,
        complexity: ComplexityTier::from_path_count(path_count),
        errors,
    }
}

// =============================================================================
// Test results
// =============================================================================

/// The judgment for one (image, method) execution. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Test name, usually the input image base name.
    pub test_name: String,
    /// Vectorization method exercised.
    pub method: Method,
    /// Edge-case profile name used for thresholds.
    pub edge_case: String,
    /// RFC 3339 timestamp of the judgment.
    pub timestamp: String,
    /// Overall verdict: `is_valid && has_paths && issues.is_empty()`.
    pub passed: bool,
    /// Structural metrics of the output.
    pub metrics: ValidationMetrics,
    /// The thresholds the output was judged against.
    pub requirements: QualityProfile,
    /// Threshold violations plus validator-internal errors.
    pub issues: Vec<String>,
}

/// Stateless-per-call validator accumulating a run-scoped result sequence.
///
/// This is the single authoritative judgment point; no other component
/// second-guesses `passed`.
#[derive(Debug, Default)]
pub struct QualityValidator {
    results: Vec<TestResult>,
}

impl QualityValidator {
    /// Create an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Judge one output: compute metrics, resolve the profile, evaluate the
    /// thresholds, append the result to the run-scoped sequence, return it.
    pub fn run_test(
        &mut self,
        output: &[u8],
        test_name: &str,
        method: Method,
        edge_case: &str,
    ) -> TestResult {
        let metrics = validate(output);
        let requirements = resolve_profile(edge_case);

        let mut issues = metrics.errors.clone();
        if metrics.path_count < requirements.min_paths {
            issues.push(format!(
                "path count {} below minimum {} for profile '{edge_case}'",
                metrics.path_count, requirements.min_paths
            ));
        }
        if metrics.path_count > requirements.max_paths {
            issues.push(format!(
                "path count {} exceeds maximum {} for profile '{edge_case}'",
                metrics.path_count, requirements.max_paths
            ));
        }
        if metrics.file_size < requirements.min_file_size {
            issues.push(format!(
                "file size {} bytes below minimum {} for profile '{edge_case}'",
                metrics.file_size, requirements.min_file_size
            ));
        }

        let passed = metrics.is_valid && metrics.has_paths && issues.is_empty();
        let result = TestResult {
            test_name: test_name.to_string(),
            method,
            edge_case: edge_case.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            passed,
            metrics,
            requirements,
            issues,
        };

        tracing::debug!(
            test = test_name,
            method = %method,
            passed = result.passed,
            issues = result.issues.len(),
            "validated output"
        );

        self.results.push(result.clone());
        result
    }

    /// The accumulated run-scoped results, in execution order.
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Consume the validator, yielding the accumulated results.
    pub fn into_results(self) -> Vec<TestResult> {
        self.results
    }
}
