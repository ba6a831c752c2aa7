use anyhow::Context;
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use xword_sync::acquire::{
    save_artifacts, upload_artifacts, Acquirer, ChromiumLauncher, HttpFetcher, WaitPolicy,
};
use xword_sync::config::{
    AcquireConfig, DriveTarget, SideEffects, SyncConfig, DEFAULT_PUZZLE_URL, DEFAULT_WAIT_SECS,
};
use xword_sync::drive::GoogleDrive;
use xword_sync::filename::DaySelector;
use xword_sync::reconciliation::{reconcile, ReconcileOptions};
use xword_sync::utils::{expand_home, DEFAULT_SAVE_DIR, MIRROR_SUBDIR};

/// Daily crossword downloader and Google Drive mirror
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download today's puzzle and solution through the print dialog
    Download {
        /// Directory to save downloaded puzzles and solutions
        #[arg(long, default_value = DEFAULT_SAVE_DIR)]
        save_dir: PathBuf,

        /// Service account JSON file, for uploading to Google Drive
        #[arg(long)]
        credentials: Option<PathBuf>,

        /// Google Drive folder to upload to
        #[arg(long)]
        folder_id: Option<String>,

        /// Run the browser without a window
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        headless: bool,

        /// Crossword host page
        #[arg(long, default_value = DEFAULT_PUZZLE_URL)]
        url: String,

        /// Seconds to wait for each page element
        #[arg(long, default_value_t = DEFAULT_WAIT_SECS)]
        wait_secs: u64,

        /// Chrome/Chromium executable (auto-detected if omitted)
        #[arg(long, env = "CHROME_PATH")]
        chrome: Option<PathBuf>,
    },

    /// Rename legacy files in Drive and mirror one weekday's crosswords locally
    Sync {
        /// Root of the local mirror (e.g. the iCloud Drive folder)
        #[arg(long, env = "ICLOUD_PATH")]
        mirror_dir: Option<PathBuf>,

        /// Folder under the mirror root holding the crosswords
        #[arg(long, default_value = MIRROR_SUBDIR)]
        subdir: String,

        /// Service account JSON file
        #[arg(long, env = "GOOGLE_SERVICE_ACCOUNT_FILE")]
        credentials: Option<PathBuf>,

        /// Google Drive folder holding the crosswords
        #[arg(long, env = "GOOGLE_FOLDER_ID")]
        folder_id: Option<String>,

        /// Weekday to mirror: a name (sun, Sunday) or an index (0 = Monday)
        #[arg(short, long, default_value = "sun")]
        day: DaySelector,

        /// Report what would change without touching anything
        #[arg(long)]
        dry_run: bool,

        /// Print the final counters as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Download {
            save_dir,
            credentials,
            folder_id,
            headless,
            url,
            wait_secs,
            chrome,
        } => {
            let upload = match DriveTarget::from_pair(credentials, folder_id) {
                Ok(upload) => upload,
                Err(e) => {
                    error!("{e}");
                    return Ok(ExitCode::FAILURE);
                }
            };

            let config = AcquireConfig {
                save_dir: expand_home(&save_dir),
                upload,
                url,
                headless,
                chrome,
                wait: Duration::from_secs(wait_secs),
                ..AcquireConfig::default()
            };
            run_download(&config).await
        }
        Command::Sync {
            mirror_dir,
            subdir,
            credentials,
            folder_id,
            day,
            dry_run,
            json,
        } => {
            let config = SyncConfig::new(
                mirror_dir,
                Some(subdir),
                credentials,
                folder_id,
                day,
                SideEffects::from_dry_run(dry_run),
            )?;
            run_sync(&config, json).await
        }
    }
}

async fn run_download(config: &AcquireConfig) -> anyhow::Result<ExitCode> {
    let launcher = ChromiumLauncher::new(config.chrome.clone(), config.headless);
    let fetcher = HttpFetcher::new();
    let acquirer = Acquirer::new(
        &launcher,
        &fetcher,
        config.url.clone(),
        WaitPolicy::new(config.wait, config.poll),
    );

    let acquired = acquirer.acquire_all().await;
    if acquired.is_empty() {
        error!("Failed to download both puzzle and solution");
        return Ok(ExitCode::FAILURE);
    }

    let today = Local::now().date_naive();
    save_artifacts(&config.save_dir, today, &acquired).await;

    if let Some(target) = &config.upload {
        info!("Uploading files to Google Drive...");
        match GoogleDrive::connect(target).await {
            Ok(drive) => {
                upload_artifacts(&drive, today, &acquired).await;
            }
            Err(e) => error!(error = %e, "Failed to upload to Google Drive"),
        }
    }

    info!("Operation completed");
    Ok(ExitCode::SUCCESS)
}

async fn run_sync(config: &SyncConfig, json: bool) -> anyhow::Result<ExitCode> {
    info!("Starting crossword sync");
    if config.side_effects.is_dry_run() {
        info!("DRY RUN MODE: No files will be modified");
    }

    let drive = GoogleDrive::connect(&config.drive)
        .await
        .context("Google Drive authentication failed")?;
    let stats = reconcile(&drive, &ReconcileOptions::from(config)).await?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
    }
    Ok(ExitCode::SUCCESS)
}
