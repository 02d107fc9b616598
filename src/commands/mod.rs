mod vault;

use passkey_vault::authenticator::AuthenticatorClient;
use passkey_vault::error::VaultError;
use passkey_vault::service::VaultService;
use passkey_vault::storage::KVStore;

use crate::cli::Commands;

pub use vault::Dispatch;

pub async fn dispatch<K: KVStore, A: AuthenticatorClient>(
    command: Commands,
    service: &mut VaultService<K, A>,
) -> Result<Dispatch, VaultError> {
    vault::dispatch(command, service).await
}
