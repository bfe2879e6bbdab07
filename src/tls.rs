use kafka_console_source::{Config, TlsConfig};
use tracing::info;

use crate::plugin::{PluginError, PluginRegistry};

/// Pick the TLS settings for the consumer.
///
/// A named TLS configurator wins. Otherwise the certificate files are used
/// when all three are given, and the connection is plaintext when they are
/// not.
pub fn resolve_tls(
    config: &Config,
    configurator: Option<&str>,
    registry: &PluginRegistry,
) -> anyhow::Result<Option<TlsConfig>> {
    if let Some(name) = configurator.filter(|name| !name.is_empty()) {
        let configurator = registry.resolve_tls_configurator(name)?;
        let tls = configurator.get_config().map_err(|source| PluginError::Tls {
            name: name.to_string(),
            source,
        })?;
        info!("Using TLS configuration from {name}");
        return Ok(Some(tls));
    }

    if let Some((cert, key, ca)) = config.tls_files() {
        let tls = TlsConfig::from_files(cert, key, ca)?;
        info!("Using TLS certificates from {}", cert.display());
        return Ok(Some(tls));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use kafka_console_source::TlsConfigurator;
    use std::collections::BTreeMap;
    use tempfile::NamedTempFile;

    struct Vault;

    impl TlsConfigurator for Vault {
        fn get_config(&self) -> kafka_console_source::Result<TlsConfig> {
            let mut properties = BTreeMap::new();
            properties.insert("ssl.ca.location".to_string(), "/vault/ca.pem".to_string());
            Ok(TlsConfig::from_properties(properties))
        }
    }

    struct Broken;

    impl TlsConfigurator for Broken {
        fn get_config(&self) -> kafka_console_source::Result<TlsConfig> {
            Err(kafka_console_source::Error::Tls("secret store unavailable".to_string()))
        }
    }

    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["test", "--bootstrap-server", "k:9092"];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn test_plaintext_by_default() {
        let registry = PluginRegistry::new();
        assert!(resolve_tls(&config(&[]), None, &registry).unwrap().is_none());
    }

    #[test]
    fn test_partial_files_are_plaintext() {
        let cert = NamedTempFile::new().unwrap();
        let registry = PluginRegistry::new();
        let config = config(&["--client-cert", cert.path().to_str().unwrap()]);
        assert!(resolve_tls(&config, None, &registry).unwrap().is_none());
    }

    #[test]
    fn test_files() {
        let cert = NamedTempFile::new().unwrap();
        let key = NamedTempFile::new().unwrap();
        let ca = NamedTempFile::new().unwrap();
        let registry = PluginRegistry::new();
        let config = config(&[
            "--client-cert",
            cert.path().to_str().unwrap(),
            "--client-key",
            key.path().to_str().unwrap(),
            "--ca-cert",
            ca.path().to_str().unwrap(),
        ]);

        let tls = resolve_tls(&config, None, &registry).unwrap().unwrap();
        assert_eq!(tls.properties().len(), 3);
    }

    #[test]
    fn test_configurator_wins_over_files() {
        let mut registry = PluginRegistry::new();
        registry.register_tls_configurator("vault", || Box::new(Vault)).unwrap();
        let config = config(&[
            "--client-cert",
            "/missing/cert.pem",
            "--client-key",
            "/missing/key.pem",
            "--ca-cert",
            "/missing/ca.pem",
        ]);

        let tls = resolve_tls(&config, Some("vault"), &registry).unwrap().unwrap();
        assert_eq!(
            tls.properties().get("ssl.ca.location").map(String::as_str),
            Some("/vault/ca.pem")
        );
    }

    #[test]
    fn test_configurator_failure_is_fatal() {
        let mut registry = PluginRegistry::new();
        registry.register_tls_configurator("broken", || Box::new(Broken)).unwrap();

        let err = resolve_tls(&config(&[]), Some("broken"), &registry).unwrap_err();
        assert!(err.to_string().contains("secret store unavailable"));

        let err = resolve_tls(&config(&[]), Some("missing"), &registry).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PluginError>(),
            Some(PluginError::NotFound { .. })
        ));
    }
}
