//! Config command handlers.

use std::fs;

use anyhow::{Context, Result};

use crate::config;

pub fn path() -> Result<()> {
    println!("{}", config::config_path().display());
    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# chatkit configuration

# base_url = "https://chat.example.com"
# token = "your-bearer-token"
# context_type = "general"

# [params]
# club_id = "42"
"#;

pub fn init() -> Result<()> {
    let path = config::config_path();
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
