use anyhow::{Context as _, Result};
use group_digest::bridge::WhatsAppBridge;

use super::Context;

fn bridge(ctx: &Context) -> WhatsAppBridge {
    WhatsAppBridge::new(&ctx.data_dir, ctx.config.bridge.clone())
}

/// `connect` — print the login QR, generating it first if not yet connected.
pub fn connect(ctx: &Context) -> Result<()> {
    let bridge = bridge(ctx);
    if bridge.is_connected() {
        println!("Already connected. Run `group-digest groups` to pick a group.");
        return Ok(());
    }
    bridge.generate_qr().context("Failed to run the QR script")?;
    let qr = bridge.qr_code()?;
    println!("Scan this code with WhatsApp (Linked devices):");
    println!();
    println!("{}", qr);
    Ok(())
}

pub fn status(ctx: &Context) -> Result<()> {
    let connected = bridge(ctx).is_connected();
    println!("Group Digest Status");
    println!("===================");
    println!("Data dir:  {}", ctx.data_dir.display());
    println!("WhatsApp:  {}", if connected { "connected" } else { "not connected" });
    println!("Source:    {}", ctx.config.fetch.source.as_str());
    println!("Store:     {:?}", ctx.config.fetch.store);
    println!("Window:    {}s", ctx.config.fetch.window_secs);
    println!("Batch:     {}", ctx.config.fetch.batch_size);
    Ok(())
}

/// `logout` — forget the WhatsApp session.
pub fn logout(ctx: &Context) -> Result<()> {
    if bridge(ctx).clear_session()? {
        println!("Session cleared. Run `group-digest connect` to log in again.");
    } else {
        println!("No session to clear.");
    }
    Ok(())
}

pub fn groups(ctx: &Context) -> Result<()> {
    let groups = bridge(ctx).list_groups().context("Failed to read groups")?;
    if groups.is_empty() {
        println!("No groups available. Please connect to WhatsApp first.");
        return Ok(());
    }
    println!("{:<32}  {}", "ID", "NAME");
    println!("{}", "-".repeat(60));
    for g in &groups {
        println!("{:<32}  {}", g.id, g.name);
    }
    Ok(())
}

pub fn download(ctx: &Context, group_id: &str) -> Result<()> {
    let path = bridge(ctx)
        .download_messages(group_id)
        .with_context(|| format!("Failed to download messages for group {}", group_id))?;
    println!("Message download completed: {}", path.display());
    Ok(())
}
