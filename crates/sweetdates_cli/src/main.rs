//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `sweetdates_core` linkage and store bootstrap from a shell.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `sweetdates_cli [--log-dir DIR] [DB_PATH]`. Without a path an
//! in-memory store is used; without `--log-dir` nothing is logged.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sweetdates_core::db::migrations::latest_version;
use sweetdates_core::{
    default_log_level, init_logging, logging_status, MemoryListQuery, StoreLocation, SweetDates,
};

struct Args {
    db_path: Option<String>,
    log_dir: Option<String>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args {
        db_path: None,
        log_dir: None,
    };
    while let Some(arg) = raw.next() {
        if arg == "--log-dir" {
            let dir = raw.next().ok_or("--log-dir needs a directory")?;
            args.log_dir = Some(dir);
        } else if args.db_path.is_none() {
            args.db_path = Some(arg);
        } else {
            return Err(format!("unexpected argument `{arg}`"));
        }
    }
    Ok(args)
}

/// Logging requires an absolute directory; relative input is resolved
/// against the working directory.
fn absolute_dir(dir: &str) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn main() -> ExitCode {
    println!("sweetdates_core version={}", sweetdates_core::core_version());
    println!("sweetdates_core latest_schema={}", latest_version());

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = args.log_dir.as_deref() {
        let log_dir = absolute_dir(log_dir);
        if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
            eprintln!("logging init failed: {err}");
            return ExitCode::FAILURE;
        }
        if let Some((level, dir)) = logging_status() {
            println!("logging level={level} dir={}", dir.display());
        }
    }

    let location = match args.db_path {
        Some(path) => StoreLocation::file(path),
        None => StoreLocation::InMemory,
    };

    let mut app = match SweetDates::open(location) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("store open failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let memories = match app.memories().list_memories(&MemoryListQuery::default()) {
        Ok(memories) => memories,
        Err(err) => {
            eprintln!("memory listing failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("store setup_complete={}", app.setup_signal().is_complete());
    println!("store memories={}", memories.len());
    ExitCode::SUCCESS
}
