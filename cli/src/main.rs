use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use svn::{
    ContentResolver, FileStatus, HistoryBrowser, HistoryPickItem, Revision, StatusSynchronizer,
    SvnClient, SvnConfig, VcsClient,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "svn-sync")]
#[command(about = "Watch a Subversion working copy and browse file history")]
struct Cli {
    /// Load engine configuration from a TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Working copy root (overrides the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Subversion executable (overrides the config file)
    #[arg(long, global = true)]
    svn: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Subversion tool version
    Version,
    /// Print the current working-copy status snapshot
    Status {
        /// Emit the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep watching the working copy and print every snapshot change
    Watch,
    /// Show revision history for a file
    Log {
        /// File to show history for
        path: String,
        /// Number of entries to request from the tool
        #[arg(short = 'l', long, default_value = "20")]
        limit: usize,
        /// Request the full history instead of a page
        #[arg(long)]
        all: bool,
    },
    /// Print the content of a file at a revision
    Cat {
        /// File to resolve
        path: String,
        /// Revision token: BASE or a revision number
        #[arg(short = 'r', long, default_value = "BASE")]
        revision: String,
        /// Print nothing instead of failing when the revision has no content
        #[arg(long)]
        lenient: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let client: Arc<dyn VcsClient> = Arc::new(SvnClient::new(config.clone())?);

    match cli.command {
        Commands::Version => {
            println!("{}", client.version().await?);
        }
        Commands::Status { json } => {
            print_status(&client, &config, json).await?;
        }
        Commands::Watch => {
            watch(&client, &config).await?;
        }
        Commands::Log { path, limit, all } => {
            let limit = if all { None } else { Some(limit) };
            show_log(&client, &path, limit).await?;
        }
        Commands::Cat {
            path,
            revision,
            lenient,
        } => {
            let revision = revision
                .parse::<Revision>()
                .map_err(Box::<dyn std::error::Error>::from)?;
            let resolver = ContentResolver::new(Arc::clone(&client));
            if lenient {
                print!("{}", resolver.get_content_or_empty(&path, &revision).await);
            } else {
                print!("{}", resolver.get_content(&path, &revision).await?);
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<SvnConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => toml::from_str(&std::fs::read_to_string(path)?)?,
        None => SvnConfig::default(),
    };

    if let Some(root) = &cli.root {
        config = config.with_working_copy_root(root.clone());
    }
    if let Some(executable) = &cli.svn {
        config = config.with_executable(executable.clone());
    }

    config.validate().map_err(Box::<dyn std::error::Error>::from)?;
    Ok(config)
}

fn status_code(status: FileStatus) -> char {
    match status {
        FileStatus::Modified => 'M',
        FileStatus::Added => 'A',
        FileStatus::Deleted => 'D',
        FileStatus::Untracked => '?',
        FileStatus::Ignored => 'I',
        FileStatus::Missing => '!',
        FileStatus::Unknown => ' ',
    }
}

async fn print_status(
    client: &Arc<dyn VcsClient>,
    config: &SvnConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let sync = StatusSynchronizer::new(
        Arc::clone(client),
        config.poll_interval,
        config.debounce_window,
    );
    sync.refresh().await;
    let snapshot = sync.current_snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
        return Ok(());
    }

    if snapshot.is_empty() {
        println!("Working copy is clean.");
    } else {
        for entry in &snapshot.entries {
            println!("{} {}", status_code(entry.status), entry.path);
        }
    }
    Ok(())
}

async fn watch(
    client: &Arc<dyn VcsClient>,
    config: &SvnConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let version = client.version().await?;
    info!(version = %version, "using Subversion");
    println!(
        "Watching {} (svn {}, every {}s). Ctrl-C to stop.",
        config.working_copy_root.display(),
        version,
        config.poll_interval.as_secs()
    );

    let sync = StatusSynchronizer::new(
        Arc::clone(client),
        config.poll_interval,
        config.debounce_window,
    );

    let reader = Arc::clone(&sync);
    let _subscription = sync.on_change(move || {
        let snapshot = reader.current_snapshot();
        println!("-- {} change(s) --", snapshot.len());
        for entry in &snapshot.entries {
            println!("{} {}", status_code(entry.status), entry.path);
        }
    });

    let poll_loop = sync.spawn_poll_loop();
    tokio::signal::ctrl_c().await?;
    sync.dispose();
    poll_loop.abort();
    Ok(())
}

async fn show_log(
    client: &Arc<dyn VcsClient>,
    path: &str,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let browser = HistoryBrowser::new(Arc::clone(client));
    let entries = browser.get_history(path, limit).await?;

    if entries.is_empty() {
        println!("No log recorded for {}", path);
        return Ok(());
    }

    for item in HistoryBrowser::pick_items(entries, limit) {
        match item {
            HistoryPickItem::Entry(entry) => {
                let summary = entry.message.lines().next().unwrap_or("");
                println!(
                    "r{:<6} {}  {:12} {}",
                    entry.revision,
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.author,
                    summary
                );
            }
            HistoryPickItem::ShowAllMarker => {
                println!("... history may be truncated; rerun with --all to show everything");
            }
        }
    }
    Ok(())
}
