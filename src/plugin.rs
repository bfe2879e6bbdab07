//! Resolution of decoder, converter and TLS configurator names.
//!
//! The built-in message types (`json`, `msgpack`, `avro`) resolve directly.
//! Any other name is looked up in a [`PluginRegistry`], where embedders
//! register factories for their own implementations before startup. Each
//! name is bound to exactly one capability; asking for a name under the
//! wrong capability is an error, as is asking for a name nobody registered.
//! Resolution happens once, before the dispatch loop starts.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use console_types::LogSink;
use decoders::{AvroDecoder, Converter, Decoder, EmbeddedJsonConverter, JsonDecoder, MsgPackDecoder};
use kafka_console_source::TlsConfigurator;
use thiserror::Error;
use tracing::debug;

/// Message types that need no plugin.
pub const SUPPORTED_TYPES: &[&str] = &["avro", "msgpack", "json"];

/// Name of the built-in converter that expands embedded JSON documents.
pub const EMBEDDED_JSON_CONVERTER: &str = "embedded-json";

pub type DecoderFactory = Arc<dyn Fn(Arc<dyn LogSink>) -> Box<dyn Decoder> + Send + Sync>;
pub type ConverterFactory = Arc<dyn Fn() -> Box<dyn Converter> + Send + Sync>;
pub type TlsConfiguratorFactory = Arc<dyn Fn() -> Box<dyn TlsConfigurator> + Send + Sync>;

/// The capability a plugin name is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Decoder,
    Converter,
    TlsConfigurator,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Decoder => "decoder",
            Capability::Converter => "converter",
            Capability::TlsConfigurator => "TLS configurator",
        };
        f.write_str(name)
    }
}

/// A registered plugin factory.
#[derive(Clone)]
pub enum Plugin {
    Decoder(DecoderFactory),
    Converter(ConverterFactory),
    TlsConfigurator(TlsConfiguratorFactory),
}

impl Plugin {
    pub fn capability(&self) -> Capability {
        match self {
            Plugin::Decoder(_) => Capability::Decoder,
            Plugin::Converter(_) => Capability::Converter,
            Plugin::TlsConfigurator(_) => Capability::TlsConfigurator,
        }
    }
}

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("plugin '{name}' not found in registry")]
    NotFound { name: String },

    #[error("plugin '{name}' is a {found}, expected a {expected}")]
    CapabilityMismatch {
        name: String,
        expected: Capability,
        found: Capability,
    },

    #[error("converter '{converter}' cannot be used with message type '{decoder}', converters only apply to avro")]
    ConverterUnsupported { decoder: String, converter: String },

    #[error("plugin '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("TLS configurator '{name}' failed: {source}")]
    Tls {
        name: String,
        #[source]
        source: kafka_console_source::Error,
    },
}

/// Named plugin factories.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Plugin>,
}

impl PluginRegistry {
    /// An empty registry. Built-in message types still resolve.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in converter.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.plugins.insert(
            EMBEDDED_JSON_CONVERTER.to_string(),
            Plugin::Converter(Arc::new(|| Box::new(EmbeddedJsonConverter::new()))),
        );
        registry
    }

    /// Register `plugin` under `name`. Built-in type names and names already
    /// in use are rejected.
    pub fn register(&mut self, name: impl Into<String>, plugin: Plugin) -> Result<(), PluginError> {
        let name = name.into();
        if builtin_type(&name).is_some() || self.plugins.contains_key(&name) {
            return Err(PluginError::AlreadyRegistered { name });
        }
        self.plugins.insert(name, plugin);
        Ok(())
    }

    pub fn register_decoder<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), PluginError>
    where
        F: Fn(Arc<dyn LogSink>) -> Box<dyn Decoder> + Send + Sync + 'static,
    {
        self.register(name, Plugin::Decoder(Arc::new(factory)))
    }

    pub fn register_converter<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), PluginError>
    where
        F: Fn() -> Box<dyn Converter> + Send + Sync + 'static,
    {
        self.register(name, Plugin::Converter(Arc::new(factory)))
    }

    pub fn register_tls_configurator<F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<(), PluginError>
    where
        F: Fn() -> Box<dyn TlsConfigurator> + Send + Sync + 'static,
    {
        self.register(name, Plugin::TlsConfigurator(Arc::new(factory)))
    }

    /// Names of every registered plugin, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn lookup(&self, name: &str) -> Result<&Plugin, PluginError> {
        self.plugins.get(name).ok_or_else(|| PluginError::NotFound {
            name: name.to_string(),
        })
    }

    /// Resolve a message type, and optionally an Avro converter, to a decoder.
    pub fn resolve_decoder(
        &self,
        msg_type: &str,
        converter: Option<&str>,
        sink: Arc<dyn LogSink>,
    ) -> Result<Box<dyn Decoder>, PluginError> {
        let converter = converter.filter(|name| !name.is_empty());

        if let Some(builtin) = builtin_type(msg_type) {
            debug!("Resolved built-in message type {builtin}");
            return match (builtin, converter) {
                ("avro", Some(name)) => {
                    let converter = self.resolve_converter(name)?;
                    Ok(Box::new(AvroDecoder::new().with_converter(converter)))
                }
                ("avro", None) => Ok(Box::new(AvroDecoder::new())),
                (_, Some(name)) => Err(PluginError::ConverterUnsupported {
                    decoder: msg_type.to_string(),
                    converter: name.to_string(),
                }),
                ("json", None) => Ok(Box::new(JsonDecoder::new(sink))),
                (_, None) => Ok(Box::new(MsgPackDecoder::new())),
            };
        }

        if let Some(name) = converter {
            return Err(PluginError::ConverterUnsupported {
                decoder: msg_type.to_string(),
                converter: name.to_string(),
            });
        }

        match self.lookup(msg_type)? {
            Plugin::Decoder(factory) => {
                debug!("Resolved decoder plugin {msg_type}");
                Ok(factory(sink))
            }
            other => Err(mismatch(msg_type, Capability::Decoder, other)),
        }
    }

    pub fn resolve_converter(&self, name: &str) -> Result<Box<dyn Converter>, PluginError> {
        match self.lookup(name)? {
            Plugin::Converter(factory) => Ok(factory()),
            other => Err(mismatch(name, Capability::Converter, other)),
        }
    }

    pub fn resolve_tls_configurator(&self, name: &str) -> Result<Box<dyn TlsConfigurator>, PluginError> {
        match self.lookup(name)? {
            Plugin::TlsConfigurator(factory) => Ok(factory()),
            other => Err(mismatch(name, Capability::TlsConfigurator, other)),
        }
    }
}

fn mismatch(name: &str, expected: Capability, found: &Plugin) -> PluginError {
    PluginError::CapabilityMismatch {
        name: name.to_string(),
        expected,
        found: found.capability(),
    }
}

/// The canonical built-in type name matching `name`, ignoring case.
fn builtin_type(name: &str) -> Option<&'static str> {
    SUPPORTED_TYPES
        .iter()
        .copied()
        .find(|builtin| builtin.eq_ignore_ascii_case(name))
}
