//! # deadwood
//!
//! **Polyglot dead-source-file detector.** Builds a project-wide import/reachability graph
//! across TypeScript/JavaScript, Python, Java, Kotlin, C#, Go, and Rust, walks it from every
//! detected entry point, and reports every file the walk never reaches -- plus every reachable
//! file with at least one export nobody consumes.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,no_run
//! use deadwood::config::DeadwoodConfig;
//! use deadwood::scan::scan_root;
//! use std::path::Path;
//!
//! let config = DeadwoodConfig::load(Path::new("."));
//! let result = scan_root(Path::new("."), &config, |progress| {
//!     eprintln!("[deadwood] {:?}: {}", progress.phase, progress.message);
//! }).expect("scan");
//!
//! for dead in &result.dead_files {
//!     println!("{}", dead.path.display());
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! deadwood .                 # scan the current project, plain-text report
//! deadwood . --json          # machine-readable report
//! deadwood . --workers 4     # override the parse worker count
//! ```

/// Core data model shared by every pipeline stage: [`model::File`], [`model::ParseResult`],
/// [`model::EntryPoint`], [`model::ExportUsageMap`], [`model::DeadFile`]/[`model::PartialFile`],
/// and the overall [`model::ScanResult`].
pub mod model;

/// Crate-level [`error::ScanError`].
pub mod error;

/// `.deadwood/config.toml` loading ([`config::DeadwoodConfig`]).
pub mod config;

/// File discovery ([`discovery::gather_files`]).
pub mod discovery;

/// Progress reporting types consumed by [`scan::scan_root`]'s callback.
pub mod progress;

/// Git history enrichment for dead-file records.
pub mod git_history;

/// Per-language parsers and the [`parsers::parse`] dispatcher.
///
/// # Submodules
///
/// - [`parsers::js`] - JavaScript/TypeScript/JSX/TSX/Vue/Svelte (OXC)
/// - [`parsers::python`] - Python
/// - [`parsers::java`] - Java and Kotlin (tree-sitter)
/// - [`parsers::csharp`] - C# (tree-sitter)
/// - [`parsers::go`] - Go
/// - [`parsers::rust_lang`] - Rust
pub mod parsers;

/// Config-file probes (bundlers, CI, workspaces, tsconfig, build systems, frameworks).
pub mod probes;

/// Entry-point detection ([`entrypoints::detect_entry_points`]).
pub mod entrypoints;

/// Per-language import resolution against a shared [`resolver::FileIndex`].
pub mod resolver;

/// Import graph construction ([`graph::ImportGraph`], [`graph::build`]).
pub mod graph;

/// Reachability walker ([`reachability::walk`]).
pub mod reachability;

/// Dead/partial-dead file classification ([`classify::classify`]).
pub mod classify;

/// Parallel parse worker pool ([`parse_pool::parse_all`]).
pub mod parse_pool;

/// Top-level scan orchestration ([`scan::scan_root`]).
pub mod scan;

/// Command-line argument parsing and report rendering.
pub mod cli;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::DeadwoodConfig;
pub use error::ScanError;
pub use model::{DeadFile, EntryPoint, PartialFile, ScanResult, ScanSummary};
pub use progress::{Phase, Progress};
pub use scan::scan_root;
