//! Example populating a record from a fixed set of values with its own registry

use environ::{Environ, Injector, Registry};
use std::collections::HashMap;
use std::net::IpAddr;

#[derive(Debug, Default, Environ)]
struct Listener {
    #[environ("BIND_ADDR, 127.0.0.1")]
    pub addr: Option<IpAddr>,

    #[environ("BIND_PORT")]
    pub port: u16,

    #[environ("SERVER_NAME, listener")]
    pub name: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = Registry::new();
    registry.register_from_str::<u16>()?;
    registry.register_fn(|raw: &str| raw.parse::<IpAddr>().map(Some))?;

    let values = HashMap::from([
        ("BIND_ADDR".to_string(), "0.0.0.0".to_string()),
        ("BIND_PORT".to_string(), "9000".to_string()),
    ]);

    let mut listener = Listener::default();
    Injector::new(&registry, &values).inject(&mut listener)?;

    println!("Listener: {:?}", listener);
    println!("Registry: {:?}", registry);

    Ok(())
}
