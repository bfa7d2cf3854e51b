//! Command-line argument parsing and report rendering (§6, §10).
//!
//! Deliberately minimal: a project root, a handful of scan-config overrides, and a choice of
//! plain-text or JSON output. The rich terminal UI (spinners, animated banners, colored output)
//! the teacher's own CLI builds is explicitly out of scope here -- see `SPEC_FULL.md` §1/§10.
//! Grounded on `src/args.rs`'s argv-parsing shape, trimmed to the single scan command.

use std::path::PathBuf;

use crate::config::DeadwoodConfig;
use crate::model::ScanResult;

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub root: PathBuf,
    pub workers: Option<usize>,
    pub extra_excludes: Vec<String>,
    pub json: bool,
    pub quiet: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        CliOptions {
            root: PathBuf::from("."),
            workers: None,
            extra_excludes: Vec::new(),
            json: false,
            quiet: false,
        }
    }
}

#[derive(Debug)]
pub enum ArgsError {
    UnknownFlag(String),
    MissingValue(String),
    InvalidValue { flag: String, value: String },
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgsError::UnknownFlag(flag) => write!(f, "unknown flag: {flag}"),
            ArgsError::MissingValue(flag) => write!(f, "{flag} requires a value"),
            ArgsError::InvalidValue { flag, value } => write!(f, "invalid value for {flag}: {value}"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Parse CLI arguments (excluding argv[0]) into [`CliOptions`].
pub fn parse_args(args: &[String]) -> Result<CliOptions, ArgsError> {
    let mut opts = CliOptions::default();
    let mut positional_seen = false;
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--workers" => {
                let value = iter.next().ok_or_else(|| ArgsError::MissingValue("--workers".to_string()))?;
                opts.workers = Some(value.parse().map_err(|_| ArgsError::InvalidValue {
                    flag: "--workers".to_string(),
                    value: value.clone(),
                })?);
            }
            "--exclude" => {
                let value = iter.next().ok_or_else(|| ArgsError::MissingValue("--exclude".to_string()))?;
                opts.extra_excludes.push(value.clone());
            }
            "--json" => opts.json = true,
            "--quiet" | "-q" => opts.quiet = true,
            other if other.starts_with('-') => return Err(ArgsError::UnknownFlag(other.to_string())),
            other => {
                if positional_seen {
                    return Err(ArgsError::UnknownFlag(other.to_string()));
                }
                opts.root = PathBuf::from(other);
                positional_seen = true;
            }
        }
    }

    Ok(opts)
}

/// Merge CLI overrides into the loaded config (CLI flags win over `.deadwood/config.toml`).
pub fn apply_overrides(mut config: DeadwoodConfig, opts: &CliOptions) -> DeadwoodConfig {
    if let Some(workers) = opts.workers {
        config.workers = Some(workers);
    }
    config.exclude.extend(opts.extra_excludes.iter().cloned());
    config
}

pub fn render_json(result: &ScanResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

pub fn render_text(result: &ScanResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "deadwood scan: {} files, {} entry points, {} reachable\n",
        result.summary.total_files, result.summary.entry_points, result.summary.reachable_files
    ));
    out.push_str(&format!(
        "  dead: {} files ({}, {} bytes)\n",
        result.summary.dead_files, result.summary.dead_rate, result.summary.total_dead_bytes
    ));
    out.push_str(&format!("  partial: {} files\n\n", result.summary.partial_files));

    if !result.dead_files.is_empty() {
        out.push_str("Fully dead files (largest first):\n");
        for dead in &result.dead_files {
            out.push_str(&format!("  {}  ({} bytes, {} lines)\n", dead.path.display(), dead.size, dead.lines));
            if let Some(author) = &dead.last_modified_author {
                out.push_str(&format!(
                    "    last touched by {author} on {}\n",
                    dead.last_modified_date.as_deref().unwrap_or("unknown")
                ));
            }
            out.push_str(&format!("    verify: {}\n", dead.verify_first_command));
        }
        out.push('\n');
    }

    if !result.partial_files.is_empty() {
        out.push_str("Partially dead files (most dead exports first):\n");
        for partial in &result.partial_files {
            out.push_str(&format!(
                "  {}  dead exports: {}\n",
                partial.path.display(),
                partial.dead_exports.join(", ")
            ));
        }
        out.push('\n');
    }

    if !result.diagnostics.is_empty() {
        out.push_str(&format!("{} diagnostics recorded during the scan.\n", result.diagnostics.len()));
    }

    out.push_str(&format!("elapsed: {:.2}s\n", result.elapsed_seconds));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_root_and_flags() {
        let args: Vec<String> = vec!["/tmp/proj", "--workers", "4", "--json"]
            .into_iter()
            .map(String::from)
            .collect();
        let opts = parse_args(&args).expect("parses");
        assert_eq!(opts.root, PathBuf::from("/tmp/proj"));
        assert_eq!(opts.workers, Some(4));
        assert!(opts.json);
    }

    #[test]
    fn rejects_unknown_flag() {
        let args: Vec<String> = vec!["--bogus".to_string()];
        assert!(matches!(parse_args(&args), Err(ArgsError::UnknownFlag(_))));
    }

    #[test]
    fn missing_workers_value_errors() {
        let args: Vec<String> = vec!["--workers".to_string()];
        assert!(matches!(parse_args(&args), Err(ArgsError::MissingValue(_))));
    }
}
