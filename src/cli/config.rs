use anyhow::{bail, Context as _, Result};
use group_digest::config::AppConfig;

use super::Context;

fn config_file(ctx: &Context) -> std::path::PathBuf {
    ctx.data_dir.join("config.json")
}

/// `config show` — the effective config (file values over defaults).
pub fn run_show(ctx: &Context) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    Ok(())
}

/// `config get <key>` — display a single config value.
///
/// Key uses dot notation: `fetch.window_secs`, `llm.model`
pub fn run_get(ctx: &Context, key: &str) -> Result<()> {
    let config = serde_json::to_value(&ctx.config)?;
    match resolve_path(&config, key) {
        Some(v) => println!("{}", serde_json::to_string_pretty(v)?),
        None => bail!("Key not found: {}", key),
    }
    Ok(())
}

/// `config set <key> <value>` — set a config value.
///
/// Value is parsed as JSON (bool, number, string). The result must still be
/// a valid config or nothing is written.
pub fn run_set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = serde_json::to_value(&ctx.config)?;
    if resolve_path(&config, key).is_none() {
        bail!("Key not found: {}", key);
    }

    // Parse the value as JSON, falling back to string
    let parsed: serde_json::Value =
        serde_json::from_str(value).unwrap_or(serde_json::Value::String(value.to_string()));
    set_path(&mut config, key, parsed.clone())?;

    let updated: AppConfig = serde_json::from_value(config)
        .with_context(|| format!("Invalid value for {}", key))?;
    updated.validate()?;
    updated.save_to(&config_file(ctx))?;

    println!("{} = {}", key, serde_json::to_string(&parsed)?);
    Ok(())
}

/// Resolve a dot-separated path in a JSON value.
fn resolve_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Set a value at an existing dot-separated path.
fn set_path(root: &mut serde_json::Value, path: &str, value: serde_json::Value) -> Result<()> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current.get_mut(segment) {
            Some(next) => next,
            None => bail!("Key not found: {}", path),
        };
    }
    *current = value;
    Ok(())
}
