use std::path::PathBuf;

use anyhow::Context;
use chat::{Author, ChatWidget, ClientError, FileClient, Submission, WidgetState};
use clap::{Args, Parser, Subcommand};
use common::FileRecord;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "filebot", about = "Chat with, upload to and search a filebot server", version)]
struct Cli {
    /// Base URL of the filebot server
    #[arg(
        long,
        env = "FILEBOT_SERVER",
        default_value = "http://localhost:5000",
        global = true
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open an interactive chat session
    Chat(ChatArgs),
    /// Upload a file
    Upload {
        /// File to upload
        file: PathBuf,
    },
    /// Print the first file whose name matches QUERY as JSON
    Search {
        /// Case-insensitive substring or regular expression
        query: String,
    },
}

#[derive(Debug, Args)]
struct ChatArgs {
    /// Where search results are saved [default: the user's download directory]
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

/// A search started from the chat that has finished.
struct SearchDone {
    query: String,
    result: Result<Vec<FileRecord>, ClientError>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = FileClient::new(&cli.server).context("Failed to configure server url")?;

    match cli.command {
        Commands::Chat(args) => {
            let download_dir = args
                .download_dir
                .or_else(dirs::download_dir)
                .unwrap_or_else(|| PathBuf::from("."));
            run_chat(client, download_dir).await
        }
        Commands::Upload { file } => {
            let reply = client
                .upload(&file)
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;
            if (200..300).contains(&reply.status) {
                println!("{}", style(&reply.message).green());
            } else {
                println!("{} {}", style(reply.status).red(), reply.message);
            }
            Ok(())
        }
        Commands::Search { query } => {
            let records = client.search(&query).await.context("Search failed")?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
    }
}

async fn run_chat(client: FileClient, download_dir: PathBuf) -> anyhow::Result<()> {
    println!(
        "{} Connected to {}. Files are saved to {}.",
        style("filebot").cyan().bold(),
        client.base_url(),
        download_dir.display()
    );
    println!(
        "{}",
        style("Type a message, /close and /open to hide or show the chat, /quit to leave.").dim()
    );

    let mut widget = ChatWidget::new(WidgetState::Open);
    let mut shown = 0;
    let (tx, mut rx) = mpsc::unbounded_channel::<SearchDone>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match line.trim() {
                    "/quit" => break,
                    "/open" => widget.open(),
                    "/close" => {
                        widget.close();
                        println!("{}", style("(chat closed)").dim());
                    }
                    input => {
                        if let Submission::Search(query) = widget.submit(input) {
                            let client = client.clone();
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                let result = client.search(&query).await;
                                let _ = tx.send(SearchDone { query, result });
                            });
                        }
                    }
                }
            }
            Some(done) = rx.recv() => {
                for record in widget.search_finished(&done.query, done.result) {
                    spawn_download(client.clone(), record, download_dir.clone());
                }
            }
        }

        if widget.state() == WidgetState::Open {
            shown = render(&widget, shown);
        }
    }

    Ok(())
}

/// Print transcript messages after index `from`. Returns the new length.
fn render(widget: &ChatWidget, from: usize) -> usize {
    let transcript = widget.transcript();
    for message in &transcript[from..] {
        match message.author {
            // Already visible as typed.
            Author::User => {}
            Author::Bot => {
                for line in message.text.lines() {
                    println!("{} {}", style("bot>").cyan().bold(), line);
                }
            }
        }
    }
    transcript.len()
}

fn spawn_download(client: FileClient, record: FileRecord, dir: PathBuf) {
    tokio::spawn(async move {
        match client.download(&record, &dir).await {
            Ok(path) => tracing::info!(path = %path.display(), "Downloaded {}", record.filename),
            Err(e) => tracing::error!(filename = %record.filename, error = %e, "Download failed"),
        }
    });
}
