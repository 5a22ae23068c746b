//! Shell export formatting
//!
//! Pure, total formatting of a [`SessionDescriptor`] into text a shell can
//! evaluate. Two dialects: POSIX `export` lines and fish `set -x` records.
//! Output is deterministic and quoted so that re-parsing it recovers the
//! original socket paths and pid exactly.

use crate::types::{AgentKind, SessionDescriptor};

/// Format a descriptor as POSIX-shell `export` lines.
pub fn sh_exports(session: &SessionDescriptor) -> String {
    let mut out = String::new();

    if session.kind == AgentKind::Gpg {
        if let Some(control) = &session.control_sock {
            out.push_str(&format!("export GPG_AGENT_INFO={}\n", sh_quote(control)));
        }
    }

    out.push_str(&format!(
        "export SSH_AUTH_SOCK={}\n",
        sh_quote(&session.auth_sock)
    ));
    out.push_str(&format!("export SSH_AGENT_PID='{}'\n", session.pid));
    out
}

/// Format a descriptor as fish `set -x` records, semicolon-terminated on a
/// single line for use with `eval`.
pub fn fish_exports(session: &SessionDescriptor) -> String {
    let mut out = String::new();

    if session.kind == AgentKind::Gpg {
        if let Some(control) = &session.control_sock {
            out.push_str(&format!("set -x GPG_AGENT_INFO {};", fish_quote(control)));
        }
    }

    out.push_str(&format!(
        "set -x SSH_AUTH_SOCK {};",
        fish_quote(&session.auth_sock)
    ));
    out.push_str(&format!("set -x SSH_AGENT_PID '{}';", session.pid));
    out
}

/// Single-quote `s` for POSIX shells; embedded quotes become `'\''`.
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Single-quote `s` for fish; backslash and quote are the only escapes
/// recognized inside fish single quotes.
fn fish_quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}
