//! `folio config check` - validate configuration and print warnings.

use anyhow::Result;

use crate::config::Config;

/// Validates `config`, printing the effective settings and any warnings.
///
/// # Errors
///
/// Returns the validation error when the configuration is unusable.
pub fn check(config: &Config) -> Result<()> {
    let result = config.validate()?;

    println!("Configuration");
    println!("=============");
    println!("Server:    {}:{}", config.server.host, config.server.port);
    match config.database_path() {
        Ok(path) => println!("Database:  {}", path.display()),
        Err(e) => println!("Database:  unavailable ({e})"),
    }
    let host = if config.images.credentials().is_some() {
        "Cloudflare Images"
    } else {
        "in-memory"
    };
    println!("Images:    {host} (variants: {})", config.images.variants.join(", "));
    let auth = if config.credentials().is_some() {
        "basic"
    } else {
        "disabled"
    };
    println!("Auth:      {auth}");

    if result.has_warnings() {
        println!();
        for warning in &result.warnings {
            println!("warning: {warning}");
        }
    } else {
        println!("\nConfiguration OK");
    }
    Ok(())
}
