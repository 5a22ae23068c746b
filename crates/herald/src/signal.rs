//! Signaling the backing agent process

use herald_core::{AgentKind, SessionDescriptor};

use crate::error::{ClientError, Result};

/// Ask a gpg-style agent to drop its cached passphrases and reload.
///
/// Other agent kinds have no cache-clear protocol, so the request is
/// refused before any signal is sent.
pub fn clear_agent(session: &SessionDescriptor) -> Result<()> {
    if session.kind != AgentKind::Gpg {
        return Err(ClientError::GpgOnly);
    }
    send_signal(session.pid, libc::SIGHUP)
}

/// Terminate the backing agent.
pub fn kill_agent(session: &SessionDescriptor) -> Result<()> {
    send_signal(session.pid, libc::SIGTERM)
}

fn send_signal(pid: u32, signal: libc::c_int) -> Result<()> {
    // SAFETY: plain kill(2) call; the pid came from the broker.
    let rc = unsafe { libc::kill(pid as libc::pid_t, signal) };
    if rc != 0 {
        return Err(ClientError::SignalFailed {
            pid,
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::SessionStatus;

    #[test]
    fn clear_refuses_non_gpg_agents() {
        let session = SessionDescriptor {
            pid: 1,
            status: SessionStatus::Running,
            kind: AgentKind::Ssh,
            auth_sock: "/tmp/auth.sock".to_string(),
            control_sock: None,
        };
        assert!(matches!(clear_agent(&session), Err(ClientError::GpgOnly)));
    }

    #[test]
    fn signaling_a_dead_pid_reports_the_os_error() {
        // Signal 0 semantics do not apply here; SIGTERM to a pid that can
        // never exist (pid_t max) fails with ESRCH.
        let err = send_signal(u32::MAX / 2, libc::SIGTERM).unwrap_err();
        assert!(matches!(err, ClientError::SignalFailed { .. }));
    }
}
