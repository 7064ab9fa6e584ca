//! `geochat config`: the effective configuration after overrides.

use console::style;

use geochat_infra::config::{apply_overrides, load_chat_config};
use geochat_types::config::ChatConfig;

use crate::state::AppPaths;

pub async fn show_config(
    paths: &AppPaths,
    name: Option<&str>,
    server: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = apply_overrides(load_chat_config(&paths.config_path).await, name, server);

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style("Config file:").bold(),
        style(paths.config_path.display()).dim()
    );
    println!();
    for (key, value) in config_rows(&config) {
        println!("  {:<22} {}", style(key).bold(), value);
    }
    println!();
    Ok(())
}

fn config_rows(config: &ChatConfig) -> Vec<(&'static str, String)> {
    vec![
        ("user_name", config.user_name.clone()),
        (
            "server_uri",
            config
                .server_uri
                .clone()
                .unwrap_or_else(|| "(not set)".to_string()),
        ),
        ("message_limit", config.message_limit.to_string()),
        (
            "connect_timeout_secs",
            config.connect_timeout_secs.to_string(),
        ),
    ]
}
