use anyhow::Result;
use clap::{Parser, Subcommand};
use nadeo_maps::credentials::{build_sources, load_credentials};
use nadeo_maps::importer::local::{DirectoryPlaylist, FsStorage, LogNotifier, LogQueue};
use nadeo_maps::importer::{ImportReport, MapImporter};
use nadeo_maps::observability::metrics::render_metrics;
use nadeo_maps::utils::config_loader;
use nadeo_maps::utils::logging::{self, LogLevel};
use nadeo_maps::TokenClient;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "nadeo-maps.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Print prometheus metrics before exiting
    #[arg(long)]
    metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print map infos as JSON
    Info {
        #[arg(required = true)]
        map_uids: Vec<String>,
    },
    /// Download maps into the maps directory and register them
    Add {
        #[arg(required = true)]
        map_uids: Vec<String>,
        /// Name shown in notifications
        #[arg(long, default_value = "console")]
        actor: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level).await?;

    // -------------------------------
    // 2. Resolve credentials, open session
    // -------------------------------

    let sources = build_sources(&service_config.credentials);
    let credentials = load_credentials(&sources).inspect_err(|e| error!("{}", e))?;
    let client = TokenClient::new(credentials, service_config.service.clone())?;

    // -------------------------------
    // 3. Run command
    // -------------------------------

    let outcome = match &args.command {
        Command::Info { map_uids } => {
            let infos = client.get_map_infos(map_uids.as_slice()).await;
            serde_json::to_string_pretty(&infos)
                .map(|json| println!("{}", json))
                .map_err(anyhow::Error::from)
        }
        Command::Add { map_uids, actor } => {
            let settings = &service_config.settings;
            let storage = FsStorage::new(settings.maps_dir());
            let playlist = DirectoryPlaylist::new(settings.maps_dir(), settings.target_dir());
            let importer = MapImporter::new(&client, storage, playlist, LogNotifier, settings.target_dir());

            let report = if settings.juke_after_adding {
                importer.with_queue(LogQueue).add_maps(actor, map_uids.as_slice()).await
            } else {
                importer.add_maps(actor, map_uids.as_slice()).await
            };
            print_report(&report);
            Ok(())
        }
    };

    if args.metrics {
        println!("{}", render_metrics().await?);
    }

    // -------------------------------
    // 4. Close session
    // -------------------------------

    client.close();
    info!("done");
    outcome
}

fn print_report(report: &ImportReport) {
    for uid in &report.added {
        println!("added  {}", uid);
    }
    for (uid, reason) in &report.failed {
        println!("failed {}: {}", uid, reason);
    }
}
