//! Integration tests for the unlock flow and environment projection,
//! exercised against a scripted gpg-style agent

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use zeroize::Zeroizing;

use herald::{env, unlock, ClientError};
use herald_core::{AgentKind, SessionDescriptor, SessionStatus};

/// Commands the fake agent received, in order.
type CommandLog = Arc<Mutex<Vec<String>>>;

/// Scripted gpg-style agent serving a single connection.
fn spawn_fake_agent(
    socket: PathBuf,
    fingerprints: Vec<String>,
    fail_fingerprint: Option<String>,
) -> CommandLog {
    let log: CommandLog = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&log);

    let listener = UnixListener::bind(&socket).expect("bind fake agent socket");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        writer
            .write_all(b"OK Pleased to meet you\n")
            .await
            .expect("greeting");

        let mut line = String::new();
        while reader.read_line(&mut line).await.unwrap_or(0) > 0 {
            let command = line.trim_end().to_string();
            seen.lock().unwrap().push(command.clone());

            let reply = if command.starts_with("KEYINFO") {
                let mut out = String::new();
                for fp in &fingerprints {
                    out.push_str(&format!("D {fp} D - - 1 P - - -\n"));
                }
                out.push_str("OK\n");
                out
            } else if command.starts_with("PRESET_PASSPHRASE") {
                let target = command.split_whitespace().nth(1).unwrap_or("");
                if fail_fingerprint.as_deref() == Some(target) {
                    "ERR 67108881 Operation cancelled <GPG Agent>\n".to_string()
                } else {
                    "OK\n".to_string()
                }
            } else if command == "BYE" {
                writer
                    .write_all(b"OK closing connection\n")
                    .await
                    .expect("bye");
                break;
            } else {
                "OK\n".to_string()
            };

            writer.write_all(reply.as_bytes()).await.expect("reply");
            line.clear();
        }
    });

    log
}

fn presets_in(log: &CommandLog) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|c| c.starts_with("PRESET_PASSPHRASE"))
        .map(|c| c.split_whitespace().nth(1).unwrap_or("").to_string())
        .collect()
}

#[tokio::test]
async fn unlock_stops_at_the_first_rejected_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("S.control");
    let log = spawn_fake_agent(
        socket.clone(),
        vec!["AAAA".to_string(), "BBBB".to_string(), "CCCC".to_string()],
        Some("BBBB".to_string()),
    );

    let err = unlock::unlock(
        &socket.to_string_lossy(),
        Some(Zeroizing::new("hunter2".to_string())),
    )
    .await
    .unwrap_err();

    match err {
        ClientError::UnlockRejected { fingerprint } => assert_eq!(fingerprint, "BBBB"),
        other => panic!("unexpected error: {other:?}"),
    }

    // The first failure aborts the batch: AAAA and BBBB were attempted,
    // CCCC never was.
    assert_eq!(presets_in(&log), vec!["AAAA", "BBBB"]);
}

#[tokio::test]
async fn unlock_presets_every_fingerprint_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("S.control");
    let log = spawn_fake_agent(
        socket.clone(),
        vec!["AAAA".to_string(), "BBBB".to_string()],
        None,
    );

    unlock::unlock(
        &socket.to_string_lossy(),
        Some(Zeroizing::new("hunter2".to_string())),
    )
    .await
    .unwrap();

    assert_eq!(presets_in(&log), vec!["AAAA", "BBBB"]);
    assert_eq!(
        log.lock().unwrap().last().map(String::as_str),
        Some("BYE"),
        "the session is closed after a successful batch"
    );
}

#[tokio::test]
async fn applying_the_environment_notifies_the_terminal_and_nothing_else() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("S.control");
    let log = spawn_fake_agent(socket.clone(), vec!["AAAA".to_string()], None);

    let session = SessionDescriptor {
        pid: 7001,
        status: SessionStatus::Running,
        kind: AgentKind::Gpg,
        auth_sock: dir.path().join("S.auth").to_string_lossy().into_owned(),
        control_sock: Some(socket.to_string_lossy().into_owned()),
    };

    env::apply_to_process_env(&session).await.unwrap();
    assert_eq!(
        std::env::var("SSH_AUTH_SOCK").unwrap(),
        session.auth_sock,
        "the authentication socket is exported to this process"
    );

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.first().map(String::as_str), Some("RESET"));
    assert!(seen.iter().any(|c| c == "UPDATESTARTUPTTY"));
    assert!(
        !seen
            .iter()
            .any(|c| c.starts_with("KEYINFO") || c.starts_with("PRESET_PASSPHRASE")),
        "terminal notification must not touch keys or passphrases"
    );
}
