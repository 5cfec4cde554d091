mod config;
mod controller;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use pwa_core::{BrowserFamily, InstallGuidance, InstallerGuide, Manifest, Msg, PromptHandle};
use pwa_logging::pwa_info;
use pwa_worker::{
    discover_precache, register_and_log, DiskCache, DurableCache, MemoryCache, ReqwestFetcher,
    Request, ServiceWorkerContainer, WorkerHandle,
};
use url::Url;

use config::HostConfig;
use controller::{ConsolePage, InstallController};
use logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "pwa_host", about = "Run the PWA install controller and service worker")]
struct Cli {
    /// RON configuration file.
    #[arg(long, default_value = "pwa.ron")]
    config: PathBuf,
    /// Also write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register and install the worker, then fetch each path through it.
    Serve { paths: Vec<String> },
    /// Print the web app manifest.
    Manifest,
    /// Show which install flow a browser gets.
    Guide { user_agent: String },
    /// Replay install signals through the install controller.
    Simulate {
        #[arg(value_enum)]
        signals: Vec<Signal>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Signal {
    BeforeInstallPrompt,
    Click,
    Installed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let destination = match cli.log_file.clone() {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    logging::initialize(destination, cli.verbose);

    let config = HostConfig::load(&cli.config)?;
    match cli.command {
        Command::Serve { paths } => serve(&config, &paths).await,
        Command::Manifest => print_manifest(&config),
        Command::Guide { user_agent } => {
            print_guidance(&user_agent);
            Ok(())
        }
        Command::Simulate { signals } => simulate(&config, &signals),
    }
}

async fn serve(config: &HostConfig, paths: &[String]) -> anyhow::Result<()> {
    let origin = Url::parse(&config.origin).with_context(|| format!("bad origin {}", config.origin))?;
    let fetcher = Arc::new(ReqwestFetcher::new(config.fetch.settings())?);
    let cache: Arc<dyn DurableCache> = match &config.cache_dir {
        Some(dir) => Arc::new(DiskCache::open(dir, config.cache_name.as_str())?),
        None => Arc::new(MemoryCache::new(config.cache_name.as_str())),
    };
    let container = ServiceWorkerContainer::new(origin, config.strategy, fetcher, cache);

    let Some(registration) = register_and_log(&container, &config.worker_url).await else {
        bail!("service worker {} is not registered", config.worker_url);
    };

    let precache = precache_manifest(config)?;
    let worker = WorkerHandle::spawn(registration.worker.clone());
    worker.install(precache).await?;

    for path in paths {
        match worker.fetch(Request::get(path.as_str())).await {
            Ok(outcome) => println!(
                "{} {} ({:?}, {} bytes)",
                outcome.response.status,
                path,
                outcome.source,
                outcome.response.body.len()
            ),
            Err(err) => println!("ERR {path}: {err}"),
        }
    }
    Ok(())
}

fn precache_manifest(config: &HostConfig) -> anyhow::Result<Vec<String>> {
    if let Some(paths) = &config.precache {
        return Ok(paths.clone());
    }
    match &config.static_root {
        Some(root) => {
            let paths = discover_precache(root, &config.static_url)
                .with_context(|| format!("listing static files under {:?}", root))?;
            pwa_info!("discovered {} static files to precache", paths.len());
            Ok(paths)
        }
        None => Ok(Vec::new()),
    }
}

fn print_manifest(config: &HostConfig) -> anyhow::Result<()> {
    let manifest = Manifest::from_settings(&config.manifest)?;
    println!("{}", serde_json::to_string_pretty(&manifest.to_json())?);
    Ok(())
}

fn print_guidance(user_agent: &str) {
    let family = BrowserFamily::from_user_agent(user_agent);
    match InstallerGuide::default().guidance(family) {
        InstallGuidance::AutoInstall { template } => {
            println!("{family}: automatic install ({template})")
        }
        InstallGuidance::Instructions { template } => {
            println!("{family}: manual instructions ({template})")
        }
        InstallGuidance::Unsupported { help_url, .. } => {
            println!("{family}: unsupported, see {help_url}")
        }
    }
}

fn simulate(config: &HostConfig, signals: &[Signal]) -> anyhow::Result<()> {
    let mut controller = InstallController::new(config.resolved_start_url(), ConsolePage);
    let mut next_prompt = 1;
    for signal in signals {
        let msg = match signal {
            Signal::BeforeInstallPrompt => {
                let handle = PromptHandle(next_prompt);
                next_prompt += 1;
                Msg::BeforeInstallPrompt(handle)
            }
            Signal::Click => Msg::InstallButtonClicked,
            Signal::Installed => Msg::AppInstalled,
        };
        controller.dispatch(msg)?;
    }
    println!(
        "install button enabled: {}",
        controller.view().install_available
    );
    Ok(())
}
