//! Test orchestration: drives each (image, method) pair through the
//! transport and session layers, persists output artifacts, and hands the
//! returned vector content to the quality validator.
//!
//! Execution is strictly sequential — one pair fully completes
//! (request → save → validate) before the next begins — so the run-scoped
//! result sequence needs no synchronization.

use crate::report::{generate_report, write_json, Report};
use crate::result::TrazarResult;
use crate::session::{Credentials, Session};
use crate::transport::{HttpReply, Transport};
use crate::validator::{Method, QualityValidator};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One declared test: an input image, the profile that judges its output,
/// and the methods to exercise. Immutable; defined before a run starts.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Path to the input raster image.
    pub input_file: PathBuf,
    /// Edge-case profile name used to resolve acceptance thresholds.
    pub edge_case: String,
    /// Vectorization methods to exercise against this input.
    pub methods: Vec<Method>,
}

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Base URL of the service under test.
    pub base_url: String,
    /// Directory receiving per-(image, method) output artifacts and the
    /// final `test-report.json`.
    pub output_dir: PathBuf,
    /// Fixed pause between successive test executions. A simple throttle to
    /// stay clear of the service's own backpressure layer, not a queue.
    pub pause: Duration,
    /// Value of the `optimize` field sent with each vectorize request.
    pub optimize: bool,
    /// Value of the `removeBackground` field sent with each request.
    pub remove_background: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            output_dir: PathBuf::from("test-output"),
            pause: Duration::from_millis(500),
            optimize: true,
            remove_background: false,
        }
    }
}

/// What a finished run produced, beyond the report itself.
#[derive(Debug)]
pub struct RunOutcome {
    /// The aggregated quality report (also persisted as JSON).
    pub report: Report,
    /// (case, method) pairs skipped because the AI engine was unavailable.
    pub skipped: usize,
    /// Request-level failures: no result was created for these.
    pub request_failures: usize,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    status: String,
    #[serde(default, rename = "aiEngineReady")]
    ai_engine_ready: bool,
}

/// Pull the vector content out of a vectorize reply.
///
/// Only responses the service itself marked successful (`success: true` with
/// an `svgContent` payload) yield content; everything else is a
/// request-level failure carrying the server's message.
pub(crate) fn extract_svg(reply: &HttpReply) -> Result<String, String> {
    let succeeded = reply.is_success()
        && reply.data.get("success").and_then(serde_json::Value::as_bool) == Some(true);
    if !succeeded {
        return Err(reply
            .server_message()
            .map_or_else(|| format!("service returned status {}", reply.status), String::from));
    }
    reply
        .data
        .get("svgContent")
        .and_then(serde_json::Value::as_str)
        .map(String::from)
        .ok_or_else(|| "success response lacked svgContent".to_string())
}

/// Artifact location for one (image, method) output:
/// `<output_dir>/<imageBaseName>_<method>.svg`.
pub(crate) fn artifact_path(output_dir: &Path, input_file: &Path, method: Method) -> PathBuf {
    let stem = input_file
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().to_string());
    output_dir.join(format!("{stem}_{method}.svg"))
}

/// Drives test cases through the service and the quality validator.
///
/// Exclusively owns the run-scoped result sequence and the single session
/// token.
#[derive(Debug)]
pub struct Orchestrator {
    transport: Transport,
    config: OrchestratorConfig,
    validator: QualityValidator,
}

impl Orchestrator {
    /// Create an orchestrator with the given configuration.
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            transport: Transport::new(),
            config,
            validator: QualityValidator::new(),
        }
    }

    /// Run every (case × method) pair and aggregate the results.
    ///
    /// Only the complete absence of a server (health check transport
    /// failure) or a failed login aborts the run; everything narrower is
    /// recorded and the next pair proceeds.
    pub async fn run(
        &mut self,
        credentials: &Credentials,
        cases: &[TestCase],
    ) -> TrazarResult<RunOutcome> {
        let ai_ready = self.check_health().await?;
        if !ai_ready {
            tracing::warn!("AI engine unavailable; AI-method cases will be skipped");
        }

        let session = Session::login(&self.transport, &self.config.base_url, credentials).await?;
        std::fs::create_dir_all(&self.config.output_dir)?;

        let mut skipped = 0;
        let mut request_failures = 0;

        for case in cases {
            for &method in &case.methods {
                if method == Method::Ai && !ai_ready {
                    skipped += 1;
                    tracing::info!(
                        input = %case.input_file.display(),
                        "skipped: AI engine not ready"
                    );
                    continue;
                }

                if let Err(message) = self.execute_one(case, method, &session).await {
                    request_failures += 1;
                    tracing::warn!(
                        input = %case.input_file.display(),
                        method = %method,
                        %message,
                        "request failed; no result recorded"
                    );
                }

                tokio::time::sleep(self.config.pause).await;
            }
        }

        let report = generate_report(self.validator.results());
        write_json(&report, &self.config.output_dir.join("test-report.json"))?;

        Ok(RunOutcome {
            report,
            skipped,
            request_failures,
        })
    }

    /// `GET /api/health`; a transport failure here means no server at all.
    async fn check_health(&self) -> TrazarResult<bool> {
        let url = format!("{}/api/health", self.config.base_url);
        let reply = self
            .transport
            .send_json(&url, reqwest::Method::GET, None, None)
            .await?;
        let health: HealthBody =
            serde_json::from_value(reply.data.clone()).unwrap_or(HealthBody {
                status: String::new(),
                ai_engine_ready: false,
            });
        tracing::info!(status = %health.status, ai_ready = health.ai_engine_ready, "service health");
        Ok(health.ai_engine_ready)
    }

    /// One pair: request → save artifact → validate.
    ///
    /// Returns `Err(message)` for request-level failures (transport errors
    /// and service-reported failures alike); a `TestResult` is only created
    /// for responses the service marked successful.
    async fn execute_one(
        &mut self,
        case: &TestCase,
        method: Method,
        session: &Session,
    ) -> Result<(), String> {
        let test_name = case
            .input_file
            .file_stem()
            .map_or_else(|| "input".to_string(), |s| s.to_string_lossy().to_string());
        tracing::info!(test = %test_name, method = %method, "vectorizing");

        let url = format!("{}/api/vectorize", self.config.base_url);
        let fields = vec![
            ("method".to_string(), method.as_str().to_string()),
            ("optimize".to_string(), self.config.optimize.to_string()),
            (
                "removeBackground".to_string(),
                self.config.remove_background.to_string(),
            ),
        ];

        let reply = self
            .transport
            .send_multipart(&url, Some(session.token()), &case.input_file, "image", &fields)
            .await
            .map_err(|e| e.to_string())?;

        let svg = extract_svg(&reply)?;

        // Persist before validation so failed outputs stay inspectable.
        let artifact = artifact_path(&self.config.output_dir, &case.input_file, method);
        std::fs::write(&artifact, &svg).map_err(|e| {
            format!("failed to write artifact {}: {e}", artifact.display())
        })?;

        let result = self
            .validator
            .run_test(svg.as_bytes(), &test_name, method, &case.edge_case);
        tracing::info!(
            test = %test_name,
            method = %method,
            passed = result.passed,
            "validated"
        );
        Ok(())
    }

    /// The results accumulated so far.
    pub fn results(&self) -> &[crate::validator::TestResult] {
        self.validator.results()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_artifact_path_naming() {
        let path = artifact_path(Path::new("out"), Path::new("fixtures/logo.png"), Method::Ai);
        assert_eq!(path, Path::new("out/logo_ai.svg"));

        let path = artifact_path(
            Path::new("test-output"),
            Path::new("icon.png"),
            Method::FallbackTracer,
        );
        assert_eq!(path, Path::new("test-output/icon_fallback-tracer.svg"));
    }

    #[test]
    fn test_extract_svg_success() {
        let reply = HttpReply {
            status: 200,
            data: json!({"success": true, "method": "ai", "svgContent": "<svg/>"}),
        };
        assert_eq!(extract_svg(&reply).unwrap(), "<svg/>");
    }

    #[test]
    fn test_extract_svg_service_reported_failure() {
        // success: false is a normal outcome with the message surfaced
        // verbatim, never an exception.
        let reply = HttpReply {
            status: 200,
            data: json!({"success": false, "message": "unsupported image format"}),
        };
        assert_eq!(
            extract_svg(&reply).unwrap_err(),
            "unsupported image format"
        );
    }

    #[test]
    fn test_extract_svg_non_success_status() {
        let reply = HttpReply {
            status: 401,
            data: json!({"success": true, "svgContent": "<svg/>"}),
        };
        // An unauthorized status is a request failure even if the body
        // claims success (expired token mid-run).
        assert!(extract_svg(&reply).is_err());
    }

    #[test]
    fn test_extract_svg_error_field_fallback() {
        let reply = HttpReply {
            status: 500,
            data: json!({"success": false, "error": "engine crashed"}),
        };
        assert_eq!(extract_svg(&reply).unwrap_err(), "engine crashed");
    }

    #[test]
    fn test_extract_svg_missing_content() {
        let reply = HttpReply {
            status: 200,
            data: json!({"success": true}),
        };
        assert!(extract_svg(&reply).unwrap_err().contains("svgContent"));
    }

    #[test]
    fn test_extract_svg_raw_text_body() {
        let reply = HttpReply {
            status: 502,
            data: serde_json::Value::String("Bad Gateway".to_string()),
        };
        assert!(extract_svg(&reply).unwrap_err().contains("502"));
    }

    #[test]
    fn test_health_body_parsing() {
        let body: HealthBody =
            serde_json::from_value(json!({"status": "ok", "aiEngineReady": true})).unwrap();
        assert!(body.ai_engine_ready);
        assert_eq!(body.status, "ok");

        let body: HealthBody = serde_json::from_value(json!({"status": "degraded"})).unwrap();
        assert!(!body.ai_engine_ready);
    }

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.pause, Duration::from_millis(500));
        assert!(config.optimize);
        assert!(!config.remove_background);
    }
}
