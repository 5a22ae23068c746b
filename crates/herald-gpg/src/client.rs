//! Control socket client implementation

use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tracing::debug;
use zeroize::Zeroizing;

use herald_core::FingerprintRecord;

use crate::assuan::{self, Reply};
use crate::error::{GpgError, Result};

/// Client for one gpg-style agent control socket session.
///
/// The connection is established eagerly and the agent greeting consumed, so
/// a constructed client is ready for commands.
pub struct GpgClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl GpgClient {
    /// Connect to the control socket and consume the greeting.
    pub async fn connect(control_sock: impl AsRef<Path>) -> Result<Self> {
        let stream = UnixStream::connect(control_sock.as_ref()).await?;
        let (reader, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(reader),
            writer,
        };

        client.collect_until_ok().await?;
        Ok(client)
    }

    /// Notify the agent of the controlling terminal so passphrase prompts
    /// surface on it. One `RESET`, the tty options, then `UPDATESTARTUPTTY`.
    pub async fn update_tty(&mut self) -> Result<()> {
        self.command("RESET").await?;

        if let Some(tty) = tty_name() {
            self.command(&format!("OPTION ttyname={}", assuan::escape(&tty)))
                .await?;
        }
        match std::env::var("TERM") {
            Ok(term) if !term.is_empty() => {
                self.command(&format!("OPTION ttytype={}", assuan::escape(&term)))
                    .await?;
            }
            _ => {}
        }

        self.command("UPDATESTARTUPTTY").await?;
        Ok(())
    }

    /// List the fingerprints of all currently loaded keys.
    ///
    /// Returns an owned sequence; the inventory is fresh per call and is
    /// released when the caller drops it.
    pub async fn keyinfo(&mut self) -> Result<Vec<FingerprintRecord>> {
        let data = self.command("KEYINFO --list --data").await?;
        Ok(data
            .iter()
            .filter_map(|line| line.split_whitespace().next())
            .map(FingerprintRecord::new)
            .collect())
    }

    /// Preset `passphrase` into the agent cache for `fingerprint`, without
    /// a timeout, so subsequent signing operations skip the pinentry.
    pub async fn preset_passphrase(&mut self, fingerprint: &str, passphrase: &str) -> Result<()> {
        // The hex copy and the assembled command both hold the passphrase;
        // scrub them on drop.
        let encoded = Zeroizing::new(hex::encode_upper(passphrase.as_bytes()));
        let command = Zeroizing::new(format!("PRESET_PASSPHRASE {fingerprint} -1 {}", *encoded));

        self.command(&command).await?;
        Ok(())
    }

    /// End the session with `BYE`. Best-effort; the agent side drops the
    /// connection either way.
    pub async fn close(mut self) {
        if self.send("BYE").await.is_ok() {
            let _ = self.collect_until_ok().await;
        }
    }

    /// Send one command and collect its data lines up to the closing `OK`.
    async fn command(&mut self, command: &str) -> Result<Vec<String>> {
        debug!(command = %command.split_whitespace().next().unwrap_or(""), "control socket command");
        self.send(command).await?;
        self.collect_until_ok().await
    }

    async fn send(&mut self, command: &str) -> Result<()> {
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read replies until `OK`, gathering data lines and skipping status
    /// noise. `ERR` aborts with the agent's code and reason.
    async fn collect_until_ok(&mut self) -> Result<Vec<String>> {
        let mut data = Vec::new();
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line).await? == 0 {
                return Err(GpgError::Protocol(
                    "agent closed the connection mid-reply".to_string(),
                ));
            }

            match assuan::parse_reply(&line) {
                Reply::Ok => return Ok(data),
                Reply::Err { code, reason } => return Err(GpgError::Agent { code, reason }),
                Reply::Data(d) => data.push(d),
                Reply::Skip => continue,
            }
        }
    }
}

/// Name of the terminal on stdin, if stdin is a terminal.
fn tty_name() -> Option<String> {
    // SAFETY: ttyname returns NULL or a pointer to a static buffer that
    // stays valid until the next call; we copy out of it immediately.
    let ptr = unsafe { libc::ttyname(libc::STDIN_FILENO) };
    if ptr.is_null() {
        return None;
    }
    let name = unsafe { std::ffi::CStr::from_ptr(ptr) };
    name.to_str().ok().map(str::to_string)
}
