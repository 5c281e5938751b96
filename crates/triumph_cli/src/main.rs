//! CLI smoke check for `triumph_core`.
//!
//! Prints the core version and a per-collection summary of the store at the
//! path given as the first argument (an in-memory store when omitted).
//! Logs go to `triumph_board_logs` under the temp dir, at `TRIUMPH_LOG_LEVEL`.

use std::process::ExitCode;
use triumph_core::{open_db, open_db_in_memory, Dashboard, SnippetListQuery};

fn main() -> ExitCode {
    let log_dir = std::env::temp_dir().join("triumph_board_logs");
    if let Err(err) = triumph_core::init_logging(
        triumph_core::level_from_env(),
        &log_dir.to_string_lossy(),
    ) {
        eprintln!("logging disabled: {err}");
    }

    println!("triumph_core ping={}", triumph_core::ping());
    println!("triumph_core version={}", triumph_core::core_version());

    let opened = match std::env::args().nth(1) {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("store open failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    let dashboard = match Dashboard::try_new(&conn) {
        Ok(dashboard) => dashboard,
        Err(err) => {
            eprintln!("dashboard init failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("quick_links={}", dashboard.quick_links().list_quick_links().len());
    println!("goals={}", dashboard.goals().list_goals().len());
    println!(
        "knowledge_snippets={}",
        dashboard
            .snippets()
            .list_snippets(&SnippetListQuery::default())
            .len()
    );
    let kinds = dashboard
        .widgets()
        .list_widget_configs()
        .into_iter()
        .map(|config| config.kind.as_str())
        .collect::<Vec<_>>();
    println!("widgets=[{}]", kinds.join(","));
    ExitCode::SUCCESS
}
