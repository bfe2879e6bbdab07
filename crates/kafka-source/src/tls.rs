use std::collections::BTreeMap;
use std::path::Path;

use rdkafka::config::ClientConfig;

use crate::error::{Error, Result};

/// TLS settings, expressed as librdkafka `ssl.*` properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    properties: BTreeMap<String, String>,
}

/// Capability for producing a TLS configuration at startup, e.g. by fetching
/// certificates from a secret store.
pub trait TlsConfigurator: Send + Sync {
    fn get_config(&self) -> Result<TlsConfig>;
}

impl TlsConfig {
    /// Use arbitrary `ssl.*` properties.
    pub fn from_properties(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    /// Client certificate, client key and CA certificate from PEM files.
    ///
    /// Every file must be readable now; a bad path is a startup error rather
    /// than a handshake failure later.
    pub fn from_files(client_cert: &Path, client_key: &Path, ca_cert: &Path) -> Result<Self> {
        let mut properties = BTreeMap::new();
        for (key, path) in [
            ("ssl.certificate.location", client_cert),
            ("ssl.key.location", client_key),
            ("ssl.ca.location", ca_cert),
        ] {
            std::fs::File::open(path).map_err(|source| Error::TlsFile {
                path: path.to_path_buf(),
                source,
            })?;
            properties.insert(key.to_string(), path.display().to_string());
        }
        Ok(Self { properties })
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Enable SSL on `client` and copy every property onto it.
    pub fn apply(&self, client: &mut ClientConfig) {
        client.set("security.protocol", "ssl");
        for (key, value) in &self.properties {
            client.set(key, value);
        }
    }
}
