//! Maps [`crate::error::VaultError`] onto process exit codes for the demo
//! CLI, following the conventional split this crate's predecessor used:
//! usage errors, I/O errors, and everything else ("software" errors).

use std::process::ExitCode;

use passkey_vault::error::VaultError;

pub const EXIT_USAGE: u8 = 64;
pub const EXIT_IO: u8 = 2;
pub const EXIT_SOFTWARE: u8 = 1;

pub fn exit_code_for_vault_error(error: &VaultError) -> ExitCode {
    use VaultError::*;

    match error {
        NoCredentials
        | LastPasskey
        | PasskeyNotFound(_)
        | VaultLocked
        | AlreadyInitialised
        | NotInitialised
        | ItemNotFound(_)
        | ItemNotAFile
        | FileTooLarge
        | AuthCancelled
        | AuthTimeout
        | PrfNotSupported
        | PrfNotEnabled => ExitCode::from(EXIT_USAGE),

        StorageError { .. } => ExitCode::from(EXIT_IO),

        DecryptionFailed | VaultCorrupted { .. } => ExitCode::from(EXIT_SOFTWARE),
    }
}
