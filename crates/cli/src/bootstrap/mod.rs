use doh_gateway_domain::config::LoggingConfig;
use doh_gateway_domain::{CliOverrides, Config, LogFormat};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    Config::load(path, overrides).map_err(|e| anyhow::anyhow!("Configuration error: {}", e))
}

/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn,reqwest=warn", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match logging.format {
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_applies_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[upstream]\nserver = \"9.9.9.9\"\nprotocol = \"tcp\"\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let overrides = CliOverrides {
            http_port: Some(9443),
            ..Default::default()
        };
        let config = load_config(file.path().to_str(), overrides).unwrap();

        assert_eq!(config.server.http_port, 9443);
        assert_eq!(config.upstream.server, "9.9.9.9");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_config_reports_invalid_protocol() {
        let overrides = CliOverrides {
            upstream_protocol: Some("quic".to_string()),
            ..Default::default()
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhttp_port = 8053").unwrap();

        let err = load_config(file.path().to_str(), overrides).unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }
}
