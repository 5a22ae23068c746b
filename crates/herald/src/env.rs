//! Process environment projection

use tracing::debug;

use herald_core::{AgentKind, SessionDescriptor};
use herald_gpg::GpgClient;

use crate::error::Result;

/// Point the current process at the session's authentication socket so any
/// program we exec inherits it.
///
/// For a gpg-style session this additionally tells the agent which terminal
/// it belongs to (a control socket call, not an environment write) so the
/// agent's own passphrase prompts surface on the invoking terminal. Exactly
/// one notification call is made; no key inventory or unlock traffic.
pub async fn apply_to_process_env(session: &SessionDescriptor) -> Result<()> {
    if session.kind == AgentKind::Gpg {
        if let Some(control_sock) = &session.control_sock {
            let mut agent = GpgClient::connect(control_sock).await?;
            agent.update_tty().await?;
            agent.close().await;
            debug!(%control_sock, "notified agent of the controlling terminal");
        }
    }

    std::env::set_var("SSH_AUTH_SOCK", &session.auth_sock);
    Ok(())
}
