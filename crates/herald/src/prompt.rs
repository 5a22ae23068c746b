//! Password prompt with terminal echo disabled

use std::io::{self, BufRead, Write};
use std::os::unix::io::RawFd;

use zeroize::Zeroizing;

use crate::error::{ClientError, Result};

/// Restores the saved `termios` settings on drop, so the terminal gets its
/// echo back on every return and unwind path. A process killed by a signal
/// skips destructors; that path is a known limitation.
struct TermiosGuard {
    fd: RawFd,
    orig: libc::termios,
}

impl Drop for TermiosGuard {
    fn drop(&mut self) {
        // Best-effort restore; nothing to do if the fd is already gone.
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSAFLUSH, &self.orig);
        }
    }
}

/// Prompt for a password on stdout and read it from stdin with echo off.
///
/// Obtaining the passphrase is this function's side effect; callers need no
/// terminal setup of their own. The returned string has trailing line
/// terminators stripped (an empty line is an empty passphrase) and is
/// scrubbed on drop.
pub async fn read_password() -> Result<Zeroizing<String>> {
    tokio::task::spawn_blocking(read_password_blocking)
        .await
        .map_err(|e| ClientError::PromptFailed(format!("prompt task panicked: {e}")))?
}

fn read_password_blocking() -> Result<Zeroizing<String>> {
    print!("Password: ");
    io::stdout()
        .flush()
        .map_err(|e| ClientError::PromptFailed(e.to_string()))?;

    let fd = libc::STDIN_FILENO;

    // Save the current settings and install the restore guard before
    // touching the echo flag.
    // SAFETY: fd is stdin and term is initialised by tcgetattr.
    let guard = unsafe {
        let mut term = std::mem::MaybeUninit::<libc::termios>::uninit();
        if libc::tcgetattr(fd, term.as_mut_ptr()) != 0 {
            return Err(ClientError::PromptFailed(format!(
                "failed to get terminal attributes: {}",
                io::Error::last_os_error()
            )));
        }
        TermiosGuard {
            fd,
            orig: term.assume_init(),
        }
    };

    let mut noecho = guard.orig;
    noecho.c_lflag &= !(libc::ECHO as libc::tcflag_t);
    noecho.c_lflag &= !(libc::ECHONL as libc::tcflag_t);

    // TCSAFLUSH also discards stale unread keypresses.
    // SAFETY: fd is valid and noecho is a copy of a valid termios.
    unsafe {
        if libc::tcsetattr(fd, libc::TCSAFLUSH, &noecho) != 0 {
            return Err(ClientError::PromptFailed(format!(
                "failed to set terminal attributes: {}",
                io::Error::last_os_error()
            )));
        }
    }

    // Zeroizing buffer: the raw bytes are scrubbed whatever happens next.
    let mut buf = Zeroizing::new(Vec::<u8>::new());
    let read = io::stdin()
        .lock()
        .read_until(b'\n', &mut buf)
        .map_err(|e| ClientError::PromptFailed(e.to_string()));

    // Restore echo before printing the newline the suppressed Enter owes us.
    drop(guard);
    println!();

    if read? == 0 {
        return Err(ClientError::PromptFailed(
            "failed to read password".to_string(),
        ));
    }

    // Strip the line terminator without assuming one exists: end-of-input
    // can deliver a bare fragment, and an empty line is a valid (empty)
    // passphrase.
    while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
        buf.pop();
    }

    let password = std::str::from_utf8(&buf)
        .map_err(|e| ClientError::PromptFailed(format!("password is not valid UTF-8: {e}")))?;
    Ok(Zeroizing::new(password.to_string()))
}
