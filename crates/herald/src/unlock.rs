//! Keyring unlock flow

use tracing::warn;
use zeroize::Zeroizing;

use herald_gpg::GpgClient;

use crate::error::{ClientError, Result};
use crate::prompt;

/// Preset one passphrase for every key loaded in the gpg-style agent behind
/// `control_sock`.
///
/// When no passphrase is supplied, one is read from the terminal first.
/// All cached keys share one human-supplied passphrase in this workflow, so
/// the first rejected preset aborts the batch: the passphrase is almost
/// certainly wrong for the rest, and agents may rate-limit repeated
/// failures. Succeeds only if every fingerprint was unlocked.
pub async fn unlock(control_sock: &str, passphrase: Option<Zeroizing<String>>) -> Result<()> {
    let passphrase = match passphrase {
        Some(passphrase) => passphrase,
        None => prompt::read_password().await?,
    };

    // Connecting directly is the capability check: only a principal with
    // access to the control socket can preset passphrases.
    let mut agent = GpgClient::connect(control_sock).await?;
    let fingerprints = agent.keyinfo().await?;

    for fingerprint in &fingerprints {
        if let Err(e) = agent.preset_passphrase(fingerprint.as_str(), &passphrase).await {
            warn!(%fingerprint, error = %e, "passphrase preset rejected");
            return Err(ClientError::UnlockRejected {
                fingerprint: fingerprint.as_str().to_string(),
            });
        }
    }

    agent.close().await;
    Ok(())
}
