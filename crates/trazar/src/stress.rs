//! Protocol-level stress checks against the live service.
//!
//! A sequence of numbered, independent checks (health, auth, listings,
//! uploads) followed by a bounded concurrency burst. The driver judges HTTP
//! availability, not content quality: it reuses the transport and session
//! layers but bypasses the quality validator entirely.

use crate::result::TrazarError;
use crate::session::{Credentials, Session};
use crate::transport::Transport;
use std::path::PathBuf;
use std::time::Instant;

/// Number of concurrent requests in the burst check.
pub const BURST_SIZE: usize = 3;

/// Statuses the burst treats as proof the transport/parsing layer survived.
///
/// Deliberately tolerant: 429 and 500 under a concurrent burst still mean
/// the request was parsed and answered, which is what this check proves.
pub const ACCEPTED_BURST_STATUSES: [u16; 3] = [200, 429, 500];

/// Verdict of one numbered check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check ran and passed.
    Passed,
    /// Check ran and failed.
    Failed,
    /// Check was not attempted (login failure upstream).
    Skipped,
}

/// One numbered check's outcome.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Position in the 1-based check sequence.
    pub number: usize,
    /// Check name.
    pub name: String,
    /// Verdict.
    pub status: CheckStatus,
    /// Failure or skip detail, when there is one.
    pub detail: Option<String>,
}

/// Run-scoped counters for the stress driver.
///
/// Explicitly constructed and owned by the driver's entry point — not
/// ambient module state — and never merged with the quality report.
#[derive(Debug)]
pub struct StressRunStats {
    checks: Vec<CheckOutcome>,
    started_at: Instant,
}

impl StressRunStats {
    /// Create empty stats, stamping the start time.
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            started_at: Instant::now(),
        }
    }

    fn record(&mut self, number: usize, name: &str, status: CheckStatus, detail: Option<String>) {
        match status {
            CheckStatus::Passed => tracing::info!(check = number, name, "check passed"),
            CheckStatus::Failed => {
                tracing::warn!(check = number, name, detail = detail.as_deref(), "check failed");
            }
            CheckStatus::Skipped => tracing::info!(check = number, name, "check skipped"),
        }
        self.checks.push(CheckOutcome {
            number,
            name: name.to_string(),
            status,
            detail,
        });
    }

    /// Total checks attempted or skipped.
    pub fn total_checks(&self) -> usize {
        self.checks.len()
    }

    /// Checks that passed.
    pub fn passed(&self) -> usize {
        self.count(CheckStatus::Passed)
    }

    /// Checks that failed.
    pub fn failed(&self) -> usize {
        self.count(CheckStatus::Failed)
    }

    /// Checks skipped after a login failure.
    pub fn skipped(&self) -> usize {
        self.count(CheckStatus::Skipped)
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    /// Every recorded outcome, in check order.
    pub fn checks(&self) -> &[CheckOutcome] {
        &self.checks
    }

    /// Render the terminal summary. Printed even when checks failed, so a
    /// user always gets the full picture of the run.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        out.push_str("══════════════════════════════════════════════════\n");
        out.push_str("  STRESS CHECK SUMMARY\n");
        out.push_str("══════════════════════════════════════════════════\n");
        for check in &self.checks {
            let mark = match check.status {
                CheckStatus::Passed => "✓",
                CheckStatus::Failed => "✗",
                CheckStatus::Skipped => "-",
            };
            out.push_str(&format!("  [{mark}] {}. {}\n", check.number, check.name));
            if let Some(ref detail) = check.detail {
                out.push_str(&format!("      └─ {detail}\n"));
            }
        }
        out.push_str(&format!(
            "  Result: {}/{} passed, {} failed, {} skipped in {:.1}s\n",
            self.passed(),
            self.total_checks(),
            self.failed(),
            self.skipped(),
            self.started_at.elapsed().as_secs_f64()
        ));
        out
    }
}

impl Default for StressRunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Judge a fan-in of burst statuses (`None` = connection failure).
///
/// Acceptable iff at least one request came back with a status in
/// [`ACCEPTED_BURST_STATUSES`].
pub fn burst_acceptable(statuses: &[Option<u16>]) -> bool {
    statuses
        .iter()
        .flatten()
        .any(|status| ACCEPTED_BURST_STATUSES.contains(status))
}

/// Drives the numbered stress checks against one service instance.
///
/// Owns its own [`StressRunStats`]; session state is not shared across runs.
#[derive(Debug)]
pub struct StressDriver {
    transport: Transport,
    base_url: String,
    credentials: Credentials,
    image_path: PathBuf,
}

const CHECK_NAMES: [&str; 9] = [
    "health endpoint responds",
    "login yields a bearer token",
    "unauthorized access is rejected",
    "authorized access is accepted",
    "background-removal models listing",
    "vectorization methods listing",
    "background-removal upload",
    "vectorization upload",
    "concurrency burst survives",
];

impl StressDriver {
    /// Create a driver for the service at `base_url`, uploading `image_path`
    /// for the multipart checks.
    pub fn new(base_url: impl Into<String>, credentials: Credentials, image_path: PathBuf) -> Self {
        Self {
            transport: Transport::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            image_path,
        }
    }

    /// Run all numbered checks. Failure of one check never aborts its
    /// siblings; only a failed login skips the token-dependent remainder.
    pub async fn run(&self) -> StressRunStats {
        let mut stats = StressRunStats::new();

        self.check_health(&mut stats).await;

        let session = match Session::login(&self.transport, &self.base_url, &self.credentials).await
        {
            Ok(session) => {
                stats.record(2, CHECK_NAMES[1], CheckStatus::Passed, None);
                session
            }
            Err(e) => {
                stats.record(2, CHECK_NAMES[1], CheckStatus::Failed, Some(e.to_string()));
                skip_remaining(&mut stats, 3);
                return stats;
            }
        };

        self.check_unauthorized(&mut stats).await;
        self.check_authorized(&mut stats, &session).await;
        self.check_get(&mut stats, 5, "/api/background-removal-models", Some(&session))
            .await;
        self.check_get(&mut stats, 6, "/api/methods", Some(&session)).await;
        self.check_remove_background(&mut stats, &session).await;
        self.check_vectorize(&mut stats, &session).await;
        self.check_burst(&mut stats, &session).await;

        stats
    }

    async fn check_health(&self, stats: &mut StressRunStats) {
        let url = format!("{}/api/health", self.base_url);
        match self
            .transport
            .send_json(&url, reqwest::Method::GET, None, None)
            .await
        {
            Ok(reply) if reply.is_success() => {
                stats.record(1, CHECK_NAMES[0], CheckStatus::Passed, None);
            }
            Ok(reply) => stats.record(
                1,
                CHECK_NAMES[0],
                CheckStatus::Failed,
                Some(format!("status {}", reply.status)),
            ),
            Err(e) => stats.record(1, CHECK_NAMES[0], CheckStatus::Failed, Some(e.to_string())),
        }
    }

    async fn check_unauthorized(&self, stats: &mut StressRunStats) {
        let url = format!("{}/api/auth/me", self.base_url);
        match self
            .transport
            .send_json(&url, reqwest::Method::GET, None, None)
            .await
        {
            Ok(reply) if reply.status == 401 => {
                stats.record(3, CHECK_NAMES[2], CheckStatus::Passed, None);
            }
            Ok(reply) => stats.record(
                3,
                CHECK_NAMES[2],
                CheckStatus::Failed,
                Some(format!("expected 401, got {}", reply.status)),
            ),
            Err(e) => stats.record(3, CHECK_NAMES[2], CheckStatus::Failed, Some(e.to_string())),
        }
    }

    async fn check_authorized(&self, stats: &mut StressRunStats, session: &Session) {
        let url = format!("{}/api/auth/me", self.base_url);
        match self
            .transport
            .send_json(&url, reqwest::Method::GET, None, Some(session.token()))
            .await
        {
            Ok(reply) if reply.is_success() => {
                stats.record(4, CHECK_NAMES[3], CheckStatus::Passed, None);
            }
            Ok(reply) => stats.record(
                4,
                CHECK_NAMES[3],
                CheckStatus::Failed,
                Some(format!("status {}", reply.status)),
            ),
            Err(e) => stats.record(4, CHECK_NAMES[3], CheckStatus::Failed, Some(e.to_string())),
        }
    }

    async fn check_get(
        &self,
        stats: &mut StressRunStats,
        number: usize,
        path: &str,
        session: Option<&Session>,
    ) {
        let url = format!("{}{path}", self.base_url);
        let token = session.map(Session::token);
        match self
            .transport
            .send_json(&url, reqwest::Method::GET, None, token)
            .await
        {
            Ok(reply) if reply.is_success() => {
                stats.record(number, CHECK_NAMES[number - 1], CheckStatus::Passed, None);
            }
            Ok(reply) => stats.record(
                number,
                CHECK_NAMES[number - 1],
                CheckStatus::Failed,
                Some(format!("status {}", reply.status)),
            ),
            Err(e) => stats.record(
                number,
                CHECK_NAMES[number - 1],
                CheckStatus::Failed,
                Some(e.to_string()),
            ),
        }
    }

    async fn check_remove_background(&self, stats: &mut StressRunStats, session: &Session) {
        let url = format!("{}/api/remove-background", self.base_url);
        let fields = vec![("quality".to_string(), "medium".to_string())];
        let outcome = self
            .transport
            .send_multipart(&url, Some(session.token()), &self.image_path, "image", &fields)
            .await;
        Self::record_upload(stats, 7, outcome);
    }

    async fn check_vectorize(&self, stats: &mut StressRunStats, session: &Session) {
        let url = format!("{}/api/vectorize", self.base_url);
        let outcome = self
            .transport
            .send_multipart(
                &url,
                Some(session.token()),
                &self.image_path,
                "image",
                &vectorize_fields(),
            )
            .await;
        Self::record_upload(stats, 8, outcome);
    }

    fn record_upload(
        stats: &mut StressRunStats,
        number: usize,
        outcome: Result<crate::transport::HttpReply, TrazarError>,
    ) {
        match outcome {
            Ok(reply) if reply.is_success() => {
                stats.record(number, CHECK_NAMES[number - 1], CheckStatus::Passed, None);
            }
            Ok(reply) => {
                let detail = reply
                    .server_message()
                    .map_or_else(|| format!("status {}", reply.status), String::from);
                stats.record(number, CHECK_NAMES[number - 1], CheckStatus::Failed, Some(detail));
            }
            Err(e) => stats.record(
                number,
                CHECK_NAMES[number - 1],
                CheckStatus::Failed,
                Some(e.to_string()),
            ),
        }
    }

    /// Fan out [`BURST_SIZE`] concurrent vectorize uploads, join them all,
    /// then classify the joint outcome. Partial completion is never
    /// observed: classification happens only after the fan-in.
    async fn check_burst(&self, stats: &mut StressRunStats, session: &Session) {
        let url = format!("{}/api/vectorize", self.base_url);
        let mut handles = Vec::with_capacity(BURST_SIZE);

        for _ in 0..BURST_SIZE {
            let transport = self.transport.clone();
            let url = url.clone();
            let token = session.token().to_string();
            let image = self.image_path.clone();
            handles.push(tokio::spawn(async move {
                transport
                    .send_multipart(&url, Some(&token), &image, "image", &vectorize_fields())
                    .await
                    .map(|reply| reply.status)
                    .ok()
            }));
        }

        let statuses: Vec<Option<u16>> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.ok().flatten())
            .collect();

        if burst_acceptable(&statuses) {
            stats.record(9, CHECK_NAMES[8], CheckStatus::Passed, None);
        } else {
            stats.record(
                9,
                CHECK_NAMES[8],
                CheckStatus::Failed,
                Some(format!("no burst request returned an accepted status: {statuses:?}")),
            );
        }
    }
}

fn vectorize_fields() -> Vec<(String, String)> {
    vec![
        ("method".to_string(), "fallback-tracer".to_string()),
        ("optimize".to_string(), "true".to_string()),
        ("removeBackground".to_string(), "false".to_string()),
    ]
}

/// Mark every check from `from` through the end of the sequence as skipped.
fn skip_remaining(stats: &mut StressRunStats, from: usize) {
    for number in from..=CHECK_NAMES.len() {
        stats.record(
            number,
            CHECK_NAMES[number - 1],
            CheckStatus::Skipped,
            Some("skipped: no bearer token (login failed)".to_string()),
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_one_ok_two_errors_is_acceptable() {
        // Scenario C, first half: two 500s and one 200 still prove the
        // transport layer survives concurrent load.
        assert!(burst_acceptable(&[Some(500), Some(200), Some(500)]));
    }

    #[test]
    fn test_burst_all_connection_failures_unacceptable() {
        // Scenario C, second half: no status at all means nothing was parsed.
        assert!(!burst_acceptable(&[None, None, None]));
    }

    #[test]
    fn test_burst_rate_limited_only_is_acceptable() {
        assert!(burst_acceptable(&[Some(429), None, None]));
    }

    #[test]
    fn test_burst_unexpected_statuses_unacceptable() {
        assert!(!burst_acceptable(&[Some(400), Some(404), None]));
    }

    #[test]
    fn test_burst_empty_fan_in_unacceptable() {
        assert!(!burst_acceptable(&[]));
    }

    #[test]
    fn test_login_failure_skips_remaining_checks() {
        // Scenario D: a failed login skips every token-dependent check and
        // the summary still reports failed >= 1.
        let mut stats = StressRunStats::new();
        stats.record(1, CHECK_NAMES[0], CheckStatus::Passed, None);
        stats.record(
            2,
            CHECK_NAMES[1],
            CheckStatus::Failed,
            Some("no accessToken field in login response".to_string()),
        );
        skip_remaining(&mut stats, 3);

        assert_eq!(stats.total_checks(), 9);
        assert_eq!(stats.passed(), 1);
        assert!(stats.failed() >= 1);
        assert_eq!(stats.skipped(), 7);

        let summary = stats.render_summary();
        assert!(summary.contains("STRESS CHECK SUMMARY"));
        assert!(summary.contains("1/9 passed"));
        assert!(summary.contains("no accessToken"));
    }

    #[test]
    fn test_stats_counters() {
        let mut stats = StressRunStats::new();
        stats.record(1, "a", CheckStatus::Passed, None);
        stats.record(2, "b", CheckStatus::Failed, Some("boom".to_string()));
        stats.record(3, "c", CheckStatus::Passed, None);
        assert_eq!(stats.total_checks(), 3);
        assert_eq!(stats.passed(), 2);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.skipped(), 0);
    }

    #[test]
    fn test_render_summary_marks() {
        let mut stats = StressRunStats::new();
        stats.record(1, "good", CheckStatus::Passed, None);
        stats.record(2, "bad", CheckStatus::Failed, Some("detail".to_string()));
        stats.record(3, "later", CheckStatus::Skipped, None);
        let summary = stats.render_summary();
        assert!(summary.contains("[✓] 1. good"));
        assert!(summary.contains("[✗] 2. bad"));
        assert!(summary.contains("[-] 3. later"));
        assert!(summary.contains("└─ detail"));
    }

    #[test]
    fn test_driver_strips_trailing_slash() {
        let driver = StressDriver::new(
            "http://localhost:3000/",
            Credentials {
                email: "qa@example.com".to_string(),
                password: "pw".to_string(),
            },
            PathBuf::from("sample.png"),
        );
        assert_eq!(driver.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_check_sequence_is_nine_long() {
        assert_eq!(CHECK_NAMES.len(), 9);
        assert_eq!(BURST_SIZE, 3);
        assert_eq!(ACCEPTED_BURST_STATUSES, [200, 429, 500]);
    }
}
