use anyhow::{bail, Result};
use group_digest::bridge::WhatsAppBridge;
use group_digest::config::SourceKind;
use group_digest::summary::verify_recent_messages;
use group_digest::time_utils;
use group_digest::{DigestError, WindowedFetcher};

use super::Context;

pub struct SyncArgs {
    pub window_secs: Option<f64>,
    pub batch_size: Option<usize>,
    pub source: Option<SourceKind>,
}

impl SyncArgs {
    fn resolve(&self, ctx: &Context) -> (f64, usize, SourceKind) {
        let fetch = &ctx.config.fetch;
        (
            self.window_secs.unwrap_or(fetch.window_secs),
            self.batch_size.unwrap_or(fetch.batch_size),
            self.source.unwrap_or(fetch.source),
        )
    }
}

/// `sync <group>` — fetch the window and report how many messages were new.
pub fn run(ctx: &Context, group_id: &str, args: &SyncArgs) -> Result<()> {
    let (window, batch, kind) = args.resolve(ctx);
    let fetcher = WindowedFetcher::new(ctx.source(kind), ctx.store()?);

    match fetcher.fetch_window(group_id, window, batch) {
        Ok(count) => {
            println!("Fetched {} new messages.", count);
            Ok(())
        }
        Err(e) => {
            if let Some(kept) = e.partial_count() {
                println!("Fetched {} new messages before the sync stopped.", kept);
            }
            if let DigestError::SourceUnavailable { .. } = e {
                eprintln!("The message source is unavailable; run the sync again later.");
            }
            Err(e.into())
        }
    }
}

/// `sync-all` — every group the bridge knows about, in parallel.
pub fn run_all(ctx: &Context, args: &SyncArgs) -> Result<()> {
    let (window, batch, kind) = args.resolve(ctx);
    let groups = WhatsAppBridge::new(&ctx.data_dir, ctx.config.bridge.clone()).list_groups()?;
    if groups.is_empty() {
        println!("No groups available. Please connect to WhatsApp first.");
        return Ok(());
    }

    let ids: Vec<String> = groups.iter().map(|g| g.id.clone()).collect();
    let fetcher = WindowedFetcher::new(ctx.source(kind), ctx.store()?);

    let mut failures = 0;
    for (group_id, result) in fetcher.sync_all(&ids, window, batch) {
        match result {
            Ok(count) => println!("{:<32}  {:>6} new", group_id, count),
            Err(e) => {
                failures += 1;
                println!("{:<32}  failed: {}", group_id, e);
            }
        }
    }
    if failures > 0 {
        bail!("{} of {} groups failed to sync", failures, ids.len());
    }
    Ok(())
}

/// `verify <group>` — how many stored messages fall inside the window.
pub fn verify(ctx: &Context, group_id: &str, window_secs: Option<f64>) -> Result<()> {
    let window = window_secs.unwrap_or(ctx.config.fetch.window_secs);
    let store = ctx.store()?;
    let count = verify_recent_messages(store.as_ref(), group_id, window, time_utils::now_secs())?;
    if count > 0 {
        println!("Found {} messages from the last {}s.", count, window);
    } else {
        println!("No recent messages found. Run `group-digest sync {}` first.", group_id);
    }
    Ok(())
}
