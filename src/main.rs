//! fnpack - serverless function build and packaging.
//!
//! This binary compiles function entry points, installs external packages and
//! writes deployable zip archives.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match fnpack::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some((stdout, stderr)) = e.process_output() {
                if !stdout.trim().is_empty() {
                    eprintln!("--- stdout ---\n{}", stdout.trim_end());
                }
                if !stderr.trim().is_empty() {
                    eprintln!("--- stderr ---\n{}", stderr.trim_end());
                }
            }
            1
        }
    };

    process::exit(exit_code);
}
