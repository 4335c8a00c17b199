use clap::{Args, Subcommand};
use std::path::Path;

use songbook::config::env_vars::EnvParser;
use songbook::config::Config as AppConfig;
use songbook::services::SimpleServices;
use songbook::{Result, SongbookError};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,

    /// List all available configuration keys
    Keys,
}

pub async fn execute(args: ConfigArgs, services: &SimpleServices) -> Result<()> {
    let config = services.config();
    let config_path = services.config_path();

    match args.command {
        ConfigCommands::Show => {
            println!("🔧 Current configuration:");
            println!("  📁 database_path: {}", config.database_path.display());
            println!("  🔌 pool_size: {}", config.pool_size);
            println!("  ⏳ busy_timeout_ms: {}", config.busy_timeout_ms);
            println!("  ⏱️  operation_timeout_seconds: {}", config.operation_timeout_seconds);
            println!("  📄 default_page_limit: {}", config.default_page_limit);
            println!("  📝 default_verse_count: {}", config.default_verse_count);

            let env_vars = EnvParser::get_all_songbook_vars();
            if !env_vars.is_empty() {
                println!("\n🌍 Environment overrides:");
                for (key, value) in env_vars {
                    println!("  {} = {}", key, value);
                }
            }
        }

        ConfigCommands::Get { key } => {
            println!("{}", config_value(&config, &key)?);
        }

        ConfigCommands::Path => {
            println!("{}", config_path.display());
        }

        ConfigCommands::Reset => {
            reset_config(config_path)?;
            println!("✅ Configuration reset to defaults");
            println!("📁 Config file: {}", config_path.display());
        }

        ConfigCommands::Keys => {
            println!("📋 Available configuration keys:");
            println!();
            println!("🗄️  Storage:");
            println!("  database_path                - SQLite file (.db, .sqlite, .sqlite3)");
            println!("  pool_size                    - Pooled connections (1-64)");
            println!("  busy_timeout_ms              - Wait on a locked database");
            println!("  operation_timeout_seconds    - Deadline per store operation (1-3600)");
            println!();
            println!("🎵 Catalog:");
            println!("  default_page_limit           - Songs per 'list' page");
            println!("  default_verse_count          - Verses shown by 'text'");
            println!();
            println!("🌍 Environment Variables:");
            println!("  All config keys can be overridden with SONGBOOK_<KEY> env vars");
            println!("  Example: SONGBOOK_POOL_SIZE=8");
        }
    }

    Ok(())
}

fn reset_config(config_path: &Path) -> Result<()> {
    AppConfig::default().save(config_path)
}

fn config_value(config: &AppConfig, key: &str) -> Result<String> {
    let value = match key {
        "database_path" => config.database_path.display().to_string(),
        "pool_size" => config.pool_size.to_string(),
        "busy_timeout_ms" => config.busy_timeout_ms.to_string(),
        "operation_timeout_seconds" => config.operation_timeout_seconds.to_string(),
        "default_page_limit" => config.default_page_limit.to_string(),
        "default_verse_count" => config.default_verse_count.to_string(),
        _ => {
            return Err(SongbookError::Validation(format!(
                "Unknown configuration key: '{}'. Use 'songbook config keys' to see available keys",
                key
            )));
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_value_lookup() {
        let config = AppConfig::default();
        assert_eq!(config_value(&config, "pool_size").unwrap(), "4");
        assert_eq!(config_value(&config, "default_page_limit").unwrap(), "5");
        assert!(config_value(&config, "redis_url").is_err());
    }

    #[test]
    fn test_reset_writes_the_loaded_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("custom.toml");
        std::fs::write(&config_path, "pool_size = 9\n").unwrap();

        reset_config(&config_path).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        let reset: AppConfig = toml::from_str(&content).unwrap();
        assert_eq!(reset, AppConfig::default());
    }
}
