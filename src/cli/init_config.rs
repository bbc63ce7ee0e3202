use ledgerfeed::config::LedgerfeedConfig;
use std::path::Path;

/// Write a default config file
pub fn execute(config_path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if config_path.exists() && !force {
        return Err(format!(
            "Config file '{}' already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    LedgerfeedConfig::create_default(config_path)?;
    println!("Created: {}", config_path.display());
    println!("Set [identity] address before submitting.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_config_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        execute(&config_path, false).unwrap();
        assert!(execute(&config_path, false).is_err());
        assert!(execute(&config_path, true).is_ok());
        assert!(LedgerfeedConfig::load(&config_path).is_ok());
    }
}
