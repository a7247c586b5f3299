//! Command-line argument definitions for the `trazador` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Trazador: exercise a vectorization service and judge its output
#[derive(Debug, Parser)]
#[command(name = "trazador", version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the vectorization service
    #[arg(long, global = true, env = "TRAZAR_URL", default_value = "http://localhost:3000")]
    pub url: String,

    /// Account email for the authentication endpoint
    #[arg(long, global = true, env = "TRAZAR_EMAIL", default_value = "qa@example.com")]
    pub email: String,

    /// Account password for the authentication endpoint
    #[arg(long, global = true, env = "TRAZAR_PASSWORD", default_value = "trazar-qa")]
    pub password: String,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the quality-validation suite over a directory of input images
    Validate(ValidateArgs),
    /// Run the numbered protocol/stress checks against the live service
    Stress(StressArgs),
}

/// Arguments for the validation suite
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Directory of input raster images; each file's stem names its
    /// edge-case profile (e.g. icon.png is judged as "icon")
    #[arg(long, default_value = "fixtures")]
    pub images: PathBuf,

    /// Directory receiving output artifacts and test-report.json
    #[arg(long, default_value = "test-output")]
    pub output: PathBuf,

    /// Pause between successive test executions, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub pause_ms: u64,

    /// Vectorization methods to exercise
    #[arg(long, value_delimiter = ',', default_values_t = ["ai".to_string(), "fallback-tracer".to_string()])]
    pub methods: Vec<String>,

    /// Send optimize=false instead of the default optimize=true
    #[arg(long)]
    pub no_optimize: bool,

    /// Request background removal before vectorization
    #[arg(long)]
    pub remove_background: bool,
}

/// Arguments for the stress checks
#[derive(Debug, Args)]
pub struct StressArgs {
    /// Sample image uploaded by the multipart and burst checks
    #[arg(long, default_value = "fixtures/icon.png")]
    pub image: PathBuf,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_validate_defaults() {
        let cli = Cli::try_parse_from(["trazador", "validate"]).unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.images, PathBuf::from("fixtures"));
                assert_eq!(args.output, PathBuf::from("test-output"));
                assert_eq!(args.pause_ms, 500);
                assert_eq!(args.methods, vec!["ai", "fallback-tracer"]);
                assert!(!args.no_optimize);
            }
            Commands::Stress(_) => panic!("expected validate"),
        }
        assert_eq!(cli.url, "http://localhost:3000");
    }

    #[test]
    fn test_cli_parses_method_list() {
        let cli = Cli::try_parse_from(["trazador", "validate", "--methods", "fallback-tracer"])
            .unwrap();
        match cli.command {
            Commands::Validate(args) => assert_eq!(args.methods, vec!["fallback-tracer"]),
            Commands::Stress(_) => panic!("expected validate"),
        }
    }

    #[test]
    fn test_cli_parses_stress() {
        let cli = Cli::try_parse_from([
            "trazador",
            "stress",
            "--image",
            "sample.png",
            "--url",
            "http://10.0.0.2:8080",
        ])
        .unwrap();
        assert_eq!(cli.url, "http://10.0.0.2:8080");
        match cli.command {
            Commands::Stress(args) => assert_eq!(args.image, PathBuf::from("sample.png")),
            Commands::Validate(_) => panic!("expected stress"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["trazador"]).is_err());
    }
}
