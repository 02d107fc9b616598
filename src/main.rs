mod cli;
mod commands;
mod exit_codes;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use passkey_vault::error::VaultError;
use passkey_vault::service::VaultService;
use passkey_vault::support::{FakeAuthenticator, MemoryStore};

/// A harness for `VaultService` over the in-memory support backends. One
/// process, one vault, no persistence across runs — real callers wire
/// `VaultService` to their own `KVStore`/`AuthenticatorClient`.
#[tokio::main]
async fn main() -> ExitCode {
    let mut service = VaultService::new(MemoryStore::new(), FakeAuthenticator::new());

    if let Err(error) = service.initialize().await {
        report_error(&error);
        return exit_codes::exit_code_for_vault_error(&error);
    }

    let stdin = io::stdin();
    let mut exit_code = ExitCode::SUCCESS;

    prompt();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            prompt();
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let cli = match Cli::try_parse_from(tokens) {
            Ok(cli) => cli,
            Err(error) => {
                println!("{error}");
                prompt();
                continue;
            }
        };

        match commands::dispatch(cli.command, &mut service).await {
            Ok(commands::Dispatch::Message(text)) => println!("{text}"),
            Ok(commands::Dispatch::Exit) => break,
            Err(error) => {
                report_error(&error);
                exit_code = exit_codes::exit_code_for_vault_error(&error);
            }
        }
        prompt();
    }

    exit_code
}

/// Surfaces every error except a cancelled authenticator prompt, which is a
/// user action, not a failure — it propagates for its exit code but is
/// never logged as an error (spec §7).
fn report_error(error: &VaultError) {
    if matches!(error, VaultError::AuthCancelled) {
        return;
    }
    eprintln!("Error: {error}");
}

fn prompt() {
    print!("passkey-vault> ");
    io::stdout().flush().ok();
}
