use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use whois_notifier::compose::SummaryComposer;
use whois_notifier::gateway::{LoggingMailGateway, MailGateway, SpoolMailGateway};
use whois_notifier::notifier::{self, UpdateNotifier};
use whois_notifier::store::InMemoryObjectStore;
use whois_notifier::{batch, config, rpsl};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// RPSL dump of the current database objects
    #[arg(long)]
    objects: PathBuf,

    /// YAML batch of processed updates
    #[arg(long)]
    batch: PathBuf,

    /// Treat the batch as a dry run regardless of the batch file
    #[arg(long)]
    dry_run: bool,

    /// Print recipients as JSON instead of sending
    #[arg(long)]
    plan: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let dump = fs::read_to_string(&args.objects)
        .with_context(|| format!("failed to read objects from {}", args.objects.display()))?;
    let objects = InMemoryObjectStore::from_objects(rpsl::parse_objects(&dump)?);
    info!(objects = objects.len(), "loaded object store");

    let batch::LoadedBatch {
        request,
        mut context,
        versions,
    } = batch::load(&args.batch, &objects)?;
    if args.dry_run {
        context.dry_run();
    }

    let gateway: Arc<dyn MailGateway> = if cfg.mail.enabled {
        Arc::new(SpoolMailGateway::new(&cfg.mail.spool_dir, cfg.mail.from.clone()))
    } else {
        Arc::new(LoggingMailGateway)
    };
    let notifier = UpdateNotifier::new(
        Arc::new(objects),
        Arc::new(versions),
        Arc::new(SummaryComposer::new(cfg.app.source.clone())),
        gateway,
    );

    if args.plan {
        let notifications = notifier.aggregate(&request, &mut context);
        println!("{}", serde_json::to_string_pretty(&notifier::plan(&notifications))?);
    } else {
        notifier.send_notifications(&request, &mut context);
    }

    Ok(())
}
