use std::any::Any;
use std::panic;
use std::process::ExitCode;

use deadwood::cli;
use deadwood::config::DeadwoodConfig;
use deadwood::progress::Progress;
use deadwood::scan::scan_root;

fn install_broken_pipe_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let is_broken = <dyn Any>::downcast_ref::<&str>(payload)
            .is_some_and(|s| s.contains("Broken pipe"))
            || <dyn Any>::downcast_ref::<String>(payload)
                .is_some_and(|s| s.contains("Broken pipe"));

        if is_broken {
            std::process::exit(0);
        }

        default_hook(info);
    }));
}

fn main() -> ExitCode {
    install_broken_pipe_handler();

    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let opts = match cli::parse_args(&raw_args) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("[deadwood][error] {e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let config = cli::apply_overrides(DeadwoodConfig::load(&opts.root), &opts);

    let result = scan_root(&opts.root, &config, |progress: Progress| {
        if !opts.quiet && !opts.json {
            eprintln!("[deadwood] {:?}: {}", progress.phase, progress.message);
        }
    });

    match result {
        Ok(scan_result) => {
            if opts.json {
                println!("{}", cli::render_json(&scan_result));
            } else {
                print!("{}", cli::render_text(&scan_result));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[deadwood][error] {e}");
            ExitCode::FAILURE
        }
    }
}

const USAGE: &str = "deadwood - polyglot dead-source-file detector\n\n\
Usage:\n  \
  deadwood [path] [--workers N] [--exclude GLOB] [--json] [--quiet]\n\n\
Arguments:\n  \
  path             Project root to scan (default: .)\n\n\
Options:\n  \
  --workers N      Parse worker count (default: min(available_parallelism, 8))\n  \
  --exclude GLOB   Extra exclusion glob, may be repeated\n  \
  --json           Emit the scan result as JSON instead of a text report\n  \
  --quiet, -q      Suppress progress lines on stderr\n";
