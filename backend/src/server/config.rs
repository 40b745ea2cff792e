//! Server configuration object.
//!
//! Every knob is a CLI flag with an environment fallback, so containers
//! configure the service through the environment and local runs through
//! flags.

use std::net::SocketAddr;

use clap::Parser;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Healthcare records API server")]
pub struct ServerConfig {
    /// Socket address to bind the HTTP listener to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 10)]
    pub pool_size: u32,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_flags_over_defaults() {
        let config = ServerConfig::try_parse_from([
            "backend",
            "--database-url",
            "postgres://localhost/records",
            "--bind-addr",
            "127.0.0.1:9999",
        ])
        .expect("valid arguments");
        assert_eq!(config.database_url, "postgres://localhost/records");
        assert_eq!(config.bind_addr.port(), 9999);
        assert_eq!(config.pool_size, 10);
    }
}
