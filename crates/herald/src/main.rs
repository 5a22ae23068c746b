//! Herald - attach shell sessions to the shared authentication agent
//!
//! Every invocation performs one round trip against the session broker,
//! projects the resulting session into the environment, and then runs at
//! most one action: print exports, add or list keys, unlock the keyring,
//! or signal the agent.

use std::convert::Infallible;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

use herald::{env, keys, signal, unlock, BrokerClient, ClientError};
use herald_core::{fish_exports, sh_exports, AgentKind, Config, SessionStatus};

#[derive(Parser)]
#[command(name = "herald")]
#[command(about = "Share one long-lived authentication agent across shell sessions")]
#[command(version)]
struct Cli {
    // The action flags share one arg group, so at most one is accepted.
    /// Print sh environment exports
    #[arg(short = 'p', long, group = "action")]
    print: bool,

    /// Print fish environment exports
    #[arg(short, long, group = "action")]
    fish: bool,

    /// Add private key identities to the agent
    #[arg(short, long, group = "action")]
    add: bool,

    /// Force cached identities to expire (gpg agent only)
    #[arg(short = 'k', long, group = "action")]
    clear: bool,

    /// Kill the running agent
    #[arg(short = 'K', long, group = "action")]
    kill: bool,

    /// List fingerprints of all loaded identities
    #[arg(short, long, group = "action")]
    list: bool,

    /// Unlock the agent's keyring, prompting when PASS is omitted (gpg agent only)
    #[arg(
        short,
        long,
        group = "action",
        value_name = "PASS",
        num_args = 0..=1,
        require_equals = true
    )]
    unlock: Option<Option<String>>,

    /// Preferred agent kind to start (ssh or gpg)
    #[arg(short = 't', long = "agent", value_name = "AGENT")]
    agent: Option<AgentKind>,

    /// Key files or bare ~/.ssh names handed to ssh-add
    #[arg(value_name = "KEY")]
    keys: Vec<String>,
}

enum Action {
    Default,
    PrintSh,
    PrintFish,
    ForceAdd,
    Clear,
    Kill,
    List,
    Unlock(Option<String>),
}

impl Cli {
    fn action(&self) -> Action {
        if self.print {
            Action::PrintSh
        } else if self.fish {
            Action::PrintFish
        } else if self.add {
            Action::ForceAdd
        } else if self.clear {
            Action::Clear
        } else if self.kill {
            Action::Kill
        } else if self.list {
            Action::List
        } else if let Some(password) = &self.unlock {
            Action::Unlock(password.clone())
        } else {
            Action::Default
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout belongs to the shell eval'ing us.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default().map_err(ClientError::Core)?;
    run(cli, config).await
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let action = cli.action();
    let kind = cli.agent.unwrap_or(config.default_agent);

    // Clear and kill must not start an agent just to tear it down, and the
    // shell that ran them is not adopting the session either.
    let source = !matches!(action, Action::Clear | Action::Kill);

    let session = BrokerClient::from_config(&config)
        .acquire(kind, source)
        .await?;

    // No session and none wanted: a clean no-op.
    if session.status == SessionStatus::Stopped {
        return Ok(());
    }

    if source {
        env::apply_to_process_env(&session).await?;
    }

    match action {
        Action::PrintSh => print!("{}", sh_exports(&session)),
        Action::PrintFish => println!("{}", fish_exports(&session)),

        Action::Default => {
            // A fresh ssh agent has no identities yet; load them before
            // first use. Running agents and gpg sessions are left alone.
            if session.status == SessionStatus::FirstRun && session.kind != AgentKind::Gpg {
                exec_delegate(keys::add_keys(&config.ssh_add_program, &cli.keys))?;
            }
        }
        Action::ForceAdd => exec_delegate(keys::add_keys(&config.ssh_add_program, &cli.keys))?,
        Action::List => exec_delegate(keys::list_keys(&config.ssh_add_program))?,

        Action::Clear => signal::clear_agent(&session)?,
        Action::Kill => signal::kill_agent(&session)?,

        Action::Unlock(password) => {
            let control_sock = match (session.kind, &session.control_sock) {
                (AgentKind::Gpg, Some(path)) => path.clone(),
                _ => return Err(ClientError::GpgOnly.into()),
            };
            unlock::unlock(&control_sock, password.map(Zeroizing::new)).await?;
        }
    }

    Ok(())
}

/// Unwrap the uninhabited success of a process-replacement delegate.
fn exec_delegate(outcome: herald::Result<Infallible>) -> Result<()> {
    match outcome {
        Ok(never) => match never {},
        Err(e) => Err(e.into()),
    }
}
