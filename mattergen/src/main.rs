//! Command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use mattergen::{BatchReport, CodegenConfig, Orchestrator};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mattergen")]
#[command(about = "Generate Rust TLV codecs from Matter cluster XML", long_about = None)]
struct Cli {
    /// Directory containing cluster XML files
    input_dir: PathBuf,

    /// Directory the generated modules are written to
    output_dir: PathBuf,

    /// Module path of the TLV library in generated code
    #[arg(long, default_value = mattergen::codegen::config::DEFAULT_TLV_PATH)]
    tlv_path: String,

    /// Module path of the serde hex helpers in generated code
    #[arg(long, default_value = mattergen::codegen::config::DEFAULT_HELPERS_PATH)]
    helpers_path: String,

    /// Generate non-optional decoders for non-nullable attributes
    #[arg(long, default_value_t = false)]
    strict_attributes: bool,

    /// Commands with more parameters take a params struct
    #[arg(long, default_value_t = mattergen::codegen::config::DEFAULT_MAX_POSITIONAL_PARAMS)]
    max_positional_params: usize,

    /// Do not write mod.rs
    #[arg(long, default_value_t = false)]
    no_mod_file: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> CodegenConfig {
        CodegenConfig::new()
            .tlv_path(self.tlv_path.as_str())
            .helpers_path(self.helpers_path.as_str())
            .strict_attributes(self.strict_attributes)
            .max_positional_params(self.max_positional_params)
            .mod_file(!self.no_mod_file)
    }

    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<BatchReport> {
    let orchestrator = Orchestrator::new(cli.config());
    tracing::debug!("configuration: {:?}", orchestrator.config());
    let files = orchestrator
        .input_files(&cli.input_dir)
        .with_context(|| format!("cannot read input directory {}", cli.input_dir.display()))?;
    if files.is_empty() {
        bail!("no .xml files found in {}", cli.input_dir.display());
    }

    let report = orchestrator
        .run(&cli.input_dir, &cli.output_dir)
        .with_context(|| format!("generation into {} failed", cli.output_dir.display()))?;
    if !report.succeeded() {
        bail!("none of the {} cluster files could be generated", report.failed.len());
    }
    Ok(report)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&cli) {
        Ok(report) => {
            println!(
                "Generated {} cluster module(s) in {}",
                report.processed,
                report.output_dir.display()
            );
            for (file, skipped) in &report.skipped {
                println!("  {file}: {skipped}");
            }
            if !report.failed.is_empty() {
                println!("Skipped {} file(s):", report.failed.len());
                for (file, error) in &report.failed {
                    println!("  {file}: {error}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CLUSTER: &str = r#"<cluster id="0x0006" name="On/Off">
  <attributes>
    <attribute id="0x0000" name="OnOff" type="bool"/>
  </attributes>
</cluster>"#;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mattergen").chain(args.iter().copied())).expect("args")
    }

    #[test]
    fn test_defaults() {
        let cli = cli(&["in", "out"]);
        let config = cli.config();
        assert_eq!(config.tlv_path, "crate::tlv");
        assert!(config.mod_file);
        assert!(!config.strict_attributes);
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn test_flags() {
        let cli = cli(&[
            "in",
            "out",
            "--tlv-path",
            "matter::tlv",
            "--strict-attributes",
            "--no-mod-file",
            "--max-positional-params",
            "3",
            "-vv",
        ]);
        let config = cli.config();
        assert_eq!(config.tlv_path, "matter::tlv");
        assert!(config.strict_attributes);
        assert!(!config.mod_file);
        assert_eq!(config.max_positional_params, 3);
        assert_eq!(cli.log_level(), "trace");
    }

    #[test]
    fn test_missing_positional_rejected() {
        assert!(Cli::try_parse_from(["mattergen", "in"]).is_err());
    }

    #[test]
    fn test_run_missing_input_dir() {
        let output = TempDir::new().expect("output dir");
        let missing = output.path().join("nope");
        let cli = cli(&[
            missing.to_str().expect("utf-8 path"),
            output.path().to_str().expect("utf-8 path"),
        ]);
        assert!(run(&cli).is_err());
    }

    #[test]
    fn test_run_empty_input_dir() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        let cli = cli(&[
            input.path().to_str().expect("utf-8 path"),
            output.path().to_str().expect("utf-8 path"),
        ]);
        let err = run(&cli).expect_err("no xml files");
        assert!(err.to_string().contains("no .xml files"));
    }

    #[test]
    fn test_run_all_failed() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        fs::write(input.path().join("Bad.xml"), "").expect("write");
        let cli = cli(&[
            input.path().to_str().expect("utf-8 path"),
            output.path().to_str().expect("utf-8 path"),
        ]);
        assert!(run(&cli).is_err());
    }

    #[test]
    fn test_run_success() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        fs::write(input.path().join("OnOff.xml"), CLUSTER).expect("write");
        fs::write(input.path().join("Bad.xml"), "").expect("write");
        let cli = cli(&[
            input.path().to_str().expect("utf-8 path"),
            output.path().to_str().expect("utf-8 path"),
        ]);
        let report = run(&cli).expect("run");
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(output.path().join("on_off.rs").is_file());
    }
}
