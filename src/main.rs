use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mandrill_mailer::{import, HttpTransport, Mailer, MailerConfig};

/// Forward a raw RFC 5322 message through the Mandrill API.
///
/// Configuration is read from `MANDRILL_*` environment variables.
#[derive(Debug, Parser)]
#[command(name = "mandrill-forward", version)]
struct Args {
    /// Message to send (`.eml`). Reads stdin when omitted.
    path: Option<PathBuf>,

    /// Let the API queue the message and reply immediately.
    #[arg(long = "async")]
    is_async: bool,

    /// Tag to attach; may be repeated.
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Subaccount to send from.
    #[arg(long)]
    subaccount: Option<String>,

    /// Mark the message as important.
    #[arg(long)]
    important: bool,

    /// Print the wire payload instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = MailerConfig::from_env().context("loading MANDRILL_* configuration")?;
    let mailer = Mailer::<HttpTransport>::from_config(config)?;

    let mut message = mailer.message();
    match &args.path {
        Some(path) => import::apply_mime_file(&mut message, path)?,
        None => {
            let mut raw = Vec::new();
            std::io::stdin()
                .read_to_end(&mut raw)
                .context("reading message from stdin")?;
            import::apply_mime(&mut message, &raw)?;
        }
    }
    message.add_tags(&args.tags);
    if let Some(subaccount) = &args.subaccount {
        message.set_subaccount(subaccount.as_str());
    }
    if args.important {
        message.set_as_important();
    }
    if args.is_async {
        message.enable_async();
    }

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&message.to_wire())?);
        return Ok(());
    }

    tracing::info!(target: "mandrill", "Forwarding {message}");
    let sent = mailer.send(&message).await;
    if let Some(transaction) = mailer.last_transaction() {
        println!("{}", serde_json::to_string_pretty(&transaction)?);
    }
    if !sent {
        anyhow::bail!("message was not accepted for every recipient");
    }
    Ok(())
}
