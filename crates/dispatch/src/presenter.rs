use std::fmt;
use std::sync::Arc;

use console_types::{DecodedValue, LogSink};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq};
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::value::RawValue;

use crate::error::PresentError;

const INDENT: &[u8] = b"     ";

/// Prints decoded values as indented JSON through the log sink.
pub struct Presenter {
    sink: Arc<dyn LogSink>,
}

impl Presenter {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Render `value` as indented JSON text.
    ///
    /// Raw JSON is only re-indented: number and string literals are printed
    /// as they appear in the payload and repeated keys are kept.
    pub fn render(value: &DecodedValue) -> Result<String, PresentError> {
        let mut out = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
        match value {
            DecodedValue::RawJson(bytes) => {
                let raw: &RawValue = serde_json::from_slice(bytes)?;
                RawNode::parse(raw)?.serialize(&mut serializer)?;
            }
            DecodedValue::Value(json) => json.serialize(&mut serializer)?,
        }

        Ok(String::from_utf8(out)?)
    }

    /// Print `value` at info level. A formatting failure is logged as an error
    /// and also returned so the caller can count it; it is never fatal.
    pub fn present(&self, value: &DecodedValue) -> Result<(), PresentError> {
        match Self::render(value) {
            Ok(text) => {
                self.sink.info(&format!("Message: {text}"));
                Ok(())
            }
            Err(e) => {
                self.sink.error(&format!("Could not process message: {e}"));
                Err(e)
            }
        }
    }
}

/// A raw JSON document split into containers, with scalars left as text.
enum RawNode<'a> {
    Scalar(&'a RawValue),
    Array(Vec<RawNode<'a>>),
    Object(Vec<(String, RawNode<'a>)>),
}

impl<'a> RawNode<'a> {
    fn parse(raw: &'a RawValue) -> serde_json::Result<Self> {
        let text = raw.get();
        match text.trim_start().as_bytes().first() {
            Some(b'{') => {
                let Entries(entries) = serde_json::from_str(text)?;
                let entries = entries
                    .into_iter()
                    .map(|(key, value)| Ok((key, Self::parse(value)?)))
                    .collect::<serde_json::Result<_>>()?;
                Ok(RawNode::Object(entries))
            }
            Some(b'[') => {
                let items: Vec<&'a RawValue> = serde_json::from_str(text)?;
                let items = items
                    .into_iter()
                    .map(Self::parse)
                    .collect::<serde_json::Result<_>>()?;
                Ok(RawNode::Array(items))
            }
            _ => Ok(RawNode::Scalar(raw)),
        }
    }
}

impl Serialize for RawNode<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawNode::Scalar(raw) => raw.serialize(serializer),
            RawNode::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            RawNode::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Object members in payload order, repeated keys included.
struct Entries<'a>(Vec<(String, &'a RawValue)>);

impl<'de> Deserialize<'de> for Entries<'de> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries<'de>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or_default());
                while let Some(entry) = map.next_entry::<String, &'de RawValue>()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
