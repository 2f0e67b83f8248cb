use crate::{
    commands::{CollectionArgs, Commands},
    env::EnvManager,
    error::CliError,
    output::{NoticeLine, ResolvedLine},
    shutdown::{Exit, ShutdownSignal},
};
use clap::Parser;
use connectors::MemoryCollection;
use engine_config::CursorSettings;
use engine_runtime::{CursorOptions, OffsetCursor, OffsetHandle, Phase};
use model::{
    events::KeyNotice,
    pagination::{cursor::OrderBy, query::Query},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;
mod script;
mod shutdown;

const SETTLE_POLL: Duration = Duration::from_millis(5);
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "pager", version = "0.1.0", about = "Offset cursor over ordered collections")]
struct Cli {
    #[arg(long, global = true, help = "Load PAGER_* settings from this env file")]
    env_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    // Logs go to stderr so stdout stays JSON lines
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let shutdown = ShutdownSignal::new();

    let exit = match run(cli, &shutdown).await {
        Err(e) => {
            error!(error = %e, "pager failed");
            Exit::Failure
        }
        Ok(()) if shutdown.received() => Exit::Interrupted,
        Ok(()) => Exit::Success,
    };
    exit.into()
}

async fn run(cli: Cli, shutdown: &ShutdownSignal) -> Result<(), CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }
    let settings = env.cursor_settings()?;

    match cli.command {
        Commands::Resolve {
            collection,
            offsets,
        } => resolve(&collection, settings, &offsets).await,
        Commands::Watch {
            collection,
            offset,
            changes,
            interval_ms,
        } => {
            shutdown.listen();
            let changes = match changes {
                Some(path) => script::load(path).await?,
                None => Vec::new(),
            };
            watch(
                &collection,
                settings,
                offset,
                changes,
                Duration::from_millis(interval_ms),
                shutdown.token(),
            )
            .await
        }
    }
}

async fn open_cursor(
    args: &CollectionArgs,
    settings: CursorSettings,
) -> Result<(MemoryCollection, OffsetHandle, Query), CliError> {
    let collection = MemoryCollection::from_json_file(&args.rows).await?;
    let field: OrderBy = args
        .order_by
        .parse()
        .map_err(|_| CliError::Config(format!("invalid ordering {}", args.order_by)))?;

    info!(rows = %args.rows, order_by = %field, max = args.max, "Opening cursor");
    let options = CursorOptions {
        field: field.clone(),
        collection: Arc::new(collection.clone()),
        max: args.max,
    };
    let cursor = OffsetCursor::spawn(options, settings)?;
    Ok((collection, cursor, Query::ordered(field)))
}

/// Polls until the cursor leaves the growing/subscribing phases.
async fn wait_settled(cursor: &OffsetHandle, offset: usize) -> Result<Phase, CliError> {
    let deadline = tokio::time::Instant::now() + SETTLE_TIMEOUT;
    loop {
        let status = cursor.status().await?;
        if !matches!(status.phase, Phase::Growing | Phase::Subscribing) {
            return Ok(status.phase);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(CliError::Unsettled(offset));
        }
        tokio::time::sleep(SETTLE_POLL).await;
    }
}

async fn resolve(
    args: &CollectionArgs,
    settings: CursorSettings,
    offsets: &[usize],
) -> Result<(), CliError> {
    let (_collection, cursor, base) = open_cursor(args, settings).await?;

    for &offset in offsets {
        cursor.go_to(offset).await?;
        let phase = wait_settled(&cursor, offset).await?;
        let key = KeyNotice::new(&cursor.get_key(offset).await?, &base);
        output::print_line(&ResolvedLine {
            offset,
            phase,
            key: &key,
        })?;
    }

    let metrics = cursor.metrics();
    info!(
        fetches = metrics.fetches,
        keys_cached = metrics.keys_cached,
        subscriptions = metrics.subscriptions,
        "Resolve finished"
    );
    cursor.shutdown().await?;
    Ok(())
}

async fn watch(
    args: &CollectionArgs,
    settings: CursorSettings,
    offset: usize,
    changes: Vec<script::Change>,
    interval: Duration,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    // Enough time for the last change to be recached and reported.
    let quiet = settings.recache().max_wait() * 2;
    let (collection, cursor, _) = open_cursor(args, settings).await?;

    let (tx, mut notices) = mpsc::unbounded_channel::<KeyNotice>();
    cursor
        .observe(move |notice: &KeyNotice| {
            let _ = tx.send(notice.clone());
        })
        .await?;
    cursor.go_to(offset).await?;

    let script_done = CancellationToken::new();
    let applier = {
        let done = script_done.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            for change in changes {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(interval) => change.apply(&collection).await,
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(quiet) => done.cancel(),
            }
        })
    };

    let mut seq = 0usize;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = script_done.cancelled() => break,
            notice = notices.recv() => match notice {
                Some(key) => {
                    output::print_line(&NoticeLine { seq, key: &key })?;
                    seq += 1;
                }
                None => break,
            },
        }
    }

    applier.abort();
    info!(notices = seq, recaches = cursor.metrics().recaches, "Watch finished");
    cursor.shutdown().await?;
    Ok(())
}
