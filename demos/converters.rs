//! Example registering custom converters

use environ::{Environ, Record};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Default, Environ)]
struct Config {
    #[environ("APP_NAME")]
    pub app_name: String,

    #[environ("REQUEST_TIMEOUT_SECS, 30")]
    pub timeout: Duration,

    #[environ("LOG_FORMAT, text")]
    pub log_format: Option<LogFormat>,

    // Not annotated, so never touched
    pub tags: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Fallible converter: any error convertible into a boxed error works
    environ::use_converter(|raw: &str| raw.parse::<u64>().map(Duration::from_secs))?;

    // Errors may also be plain strings
    environ::use_converter(|raw: &str| match raw {
        "text" => Ok(Some(LogFormat::Text)),
        "json" => Ok(Some(LogFormat::Json)),
        other => Err(format!("unknown log format '{}'", other)),
    })?;

    std::env::set_var("APP_NAME", "my-app");
    std::env::set_var("LOG_FORMAT", "json");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  App Name: {}", config.app_name);
    println!("  Timeout: {:?}", config.timeout);
    println!("  Log Format: {:?}", config.log_format);
    println!("  Tags: {:?}", config.tags);

    // A value the converter rejects surfaces as a single error naming the variable
    std::env::set_var("LOG_FORMAT", "xml");
    if let Err(e) = Config::from_env() {
        println!("Rejected: {}", e);
    }

    Ok(())
}
