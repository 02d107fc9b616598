//! Command grammar for the demo CLI (spec §1 "a CLI or desktop shell
//! consuming this crate").
//!
//! This binary is a harness for exercising [`crate::service::VaultService`]
//! end to end over the in-memory [`crate::support`] backends; it is not
//! itself part of the spec's surface, and its state does not persist
//! across invocations. One line of input is one command.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "passkey-vault",
    author,
    version,
    about = "A client-side encrypted vault unlocked by a hardware passkey.",
    no_binary_name = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Show whether the vault is uninitialised, locked, or unlocked.")]
    Status,

    #[command(about = "Create the vault and enroll the first passkey.")]
    Setup {
        user_name: String,
        passkey_name: String,
    },

    #[command(about = "Unlock the vault with any enrolled passkey.")]
    Unlock,

    #[command(about = "Lock the vault, dropping the key from memory.")]
    Lock,

    #[command(about = "Enroll an additional passkey for the current vault.")]
    AddPasskey { name: String },

    #[command(about = "Remove an enrolled passkey.")]
    RemovePasskey { credential_id: String },

    #[command(about = "Rename an enrolled passkey.")]
    RenamePasskey {
        credential_id: String,
        new_name: String,
    },

    #[command(about = "List enrolled passkeys.")]
    Passkeys,

    #[command(about = "Add a password item.")]
    AddPassword {
        title: String,
        content: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },

    #[command(about = "Add a note item.")]
    AddNote { title: String, content: String },

    #[command(about = "Add a generic secret item.")]
    AddSecret { title: String, content: String },

    #[command(about = "List every item in the unlocked vault.")]
    List,

    #[command(about = "Case-insensitive substring search over vault items.")]
    Search { query: String },

    #[command(about = "Delete an item by id.")]
    Delete { id: String },

    #[command(about = "Generate a password with the built-in rejection-sampling generator.")]
    Generate {
        #[arg(short, long, default_value_t = 20usize)]
        length: usize,
    },

    #[command(about = "Wipe the vault and every stored file, returning to uninitialised.")]
    Reset,

    #[command(about = "End the session.")]
    Exit,
}
