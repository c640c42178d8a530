//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `gymdesk_core` linkage.
//! - Show which API endpoint the core would talk to.

use gymdesk_core::ClientConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("gymdesk_core ping={}", gymdesk_core::ping());
    println!("gymdesk_core version={}", gymdesk_core::core_version());

    match ClientConfig::from_env() {
        Ok(config) => {
            println!("gymdesk_core api_base_url={}", config.api_base_url());
            println!("gymdesk_core socket_url={}", config.socket_url());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("gymdesk_core config_error={err}");
            ExitCode::FAILURE
        }
    }
}
