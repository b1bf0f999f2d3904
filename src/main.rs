//! wbs - Local-first work breakdown planner

use std::process::ExitCode;

fn main() -> ExitCode {
    match wbs_planner::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
