//! Basic usage example

use environ::{Environ, Record};

#[derive(Debug, Default, Environ)]
struct Config {
    // Required: loaded from APP_HOST
    #[environ("APP_HOST")]
    pub host: String,

    // Falls back to 8080 when APP_PORT is not set
    #[environ("APP_PORT, 8080")]
    pub port: u16,

    #[environ("APP_DEBUG, false")]
    pub debug: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Non-string fields need a converter for their type
    environ::use_from_str::<u16>()?;
    environ::use_from_str::<bool>()?;

    // Set environment variables for demonstration
    std::env::set_var("APP_HOST", "localhost");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Host: {}", config.host);
    println!("  Port: {}", config.port);
    println!("  Debug: {}", config.debug);

    Ok(())
}
