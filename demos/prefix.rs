//! Example using a struct-level prefix

use environ::{Environ, Record};

#[derive(Debug, Default, Environ)]
#[environ(prefix = "MYAPP_")]
struct Config {
    // Reads MYAPP_DATABASE_URL
    #[environ("DATABASE_URL")]
    pub database_url: String,

    // Reads MYAPP_PORT, defaulting to 8080
    #[environ("PORT, 8080")]
    pub port: u16,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    environ::use_from_str::<u16>()?;

    std::env::set_var("MYAPP_DATABASE_URL", "postgres://localhost/mydb");
    std::env::set_var("MYAPP_PORT", "3000");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Database URL: {}", config.database_url);
    println!("  Port: {}", config.port);

    Ok(())
}
