use uuid::Uuid;

use passkey_vault::authenticator::AuthenticatorClient;
use passkey_vault::error::VaultError;
use passkey_vault::password;
use passkey_vault::service::{
    AddItemKind, NewNoteItem, NewPasswordItem, NewSecretItem, VaultService, VaultState,
};
use passkey_vault::storage::KVStore;

use crate::cli::Commands;

pub enum Dispatch {
    Message(String),
    Exit,
}

fn message(text: impl Into<String>) -> Result<Dispatch, VaultError> {
    Ok(Dispatch::Message(text.into()))
}

pub async fn dispatch<K: KVStore, A: AuthenticatorClient>(
    command: Commands,
    service: &mut VaultService<K, A>,
) -> Result<Dispatch, VaultError> {
    match command {
        Commands::Status => {
            let state = match service.state() {
                VaultState::Uninitialised => "uninitialised",
                VaultState::Locked => "locked",
                VaultState::Unlocked => "unlocked",
            };
            let item_count = service.metadata().map(|m| m.item_count);
            message(match item_count {
                Some(count) => format!("vault is {state} ({count} items)"),
                None => format!("vault is {state}"),
            })
        }

        Commands::Setup {
            user_name,
            passkey_name,
        } => {
            service.setup(&user_name, &passkey_name).await?;
            message("vault created and unlocked")
        }

        Commands::Unlock => {
            service.unlock().await?;
            message("vault unlocked")
        }

        Commands::Lock => {
            service.lock();
            message("vault locked")
        }

        Commands::AddPasskey { name } => {
            service.add_passkey(&name).await?;
            message(format!("passkey '{name}' enrolled"))
        }

        Commands::RemovePasskey { credential_id } => {
            service.remove_passkey(&credential_id).await?;
            message("passkey removed")
        }

        Commands::RenamePasskey {
            credential_id,
            new_name,
        } => {
            service.rename_passkey(&credential_id, &new_name).await?;
            message("passkey renamed")
        }

        Commands::Passkeys => {
            let lines: Vec<String> = service
                .credentials()
                .iter()
                .map(|c| format!("{} — {} ({:?})", c.id, c.name, c.authenticator_type))
                .collect();
            if lines.is_empty() {
                message("no passkeys enrolled")
            } else {
                message(lines.join("\n"))
            }
        }

        Commands::AddPassword {
            title,
            content,
            url,
            username,
        } => {
            let id = service
                .add_vault_item(AddItemKind::Password(NewPasswordItem {
                    title,
                    content,
                    url,
                    username,
                }))
                .await?;
            message(format!("added item {id}"))
        }

        Commands::AddNote { title, content } => {
            let id = service
                .add_vault_item(AddItemKind::Note(NewNoteItem { title, content }))
                .await?;
            message(format!("added item {id}"))
        }

        Commands::AddSecret { title, content } => {
            let id = service
                .add_vault_item(AddItemKind::Secret(NewSecretItem { title, content }))
                .await?;
            message(format!("added item {id}"))
        }

        Commands::List => {
            let items = service.items().ok_or(VaultError::VaultLocked)?;
            if items.is_empty() {
                return message("vault is empty");
            }
            let lines: Vec<String> = items
                .iter()
                .map(|item| format!("{} [{:?}] {}", item.id, item.item_type, item.title))
                .collect();
            message(lines.join("\n"))
        }

        Commands::Search { query } => {
            let results = service.search(&query);
            if results.is_empty() {
                return message("no matches");
            }
            let lines: Vec<String> = results
                .iter()
                .map(|item| format!("{} [{:?}] {}", item.id, item.item_type, item.title))
                .collect();
            message(lines.join("\n"))
        }

        Commands::Delete { id } => {
            let id = Uuid::parse_str(&id)
                .map_err(|_| VaultError::ItemNotFound(id.clone()))?;
            service.delete_vault_item(id).await?;
            message("item deleted")
        }

        Commands::Generate { length } => message(password::generate(length)),

        Commands::Reset => {
            service.reset().await?;
            message("vault reset")
        }

        Commands::Exit => Ok(Dispatch::Exit),
    }
}
