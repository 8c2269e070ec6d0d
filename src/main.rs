/*
 * Responsibility
 * - Entry point; exit status comes from app::run() (no logic here)
 */
use std::process::ExitCode;

fn main() -> ExitCode {
    jwt_mint::app::run()
}
