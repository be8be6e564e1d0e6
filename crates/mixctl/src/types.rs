use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Device number reserved for the software audio server.
pub const SOFTWARE_DEVICE_ID: u32 = 99999;

/// Interface tag reported for every control.
pub const IFACE_MIXER: &str = "MIXER";

/// Access descriptor reported for every control. Not derived from the report.
pub const ACCESS_READ_WRITE: &str = "rw------";

/// Device number → display name.
pub type CardMap = BTreeMap<u32, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    Enumerated,
    Boolean,
    Integer,
    /// Capability token the parser does not model.
    Other(String),
}

impl ControlKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Enumerated => "ENUMERATED",
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Other(token) => token,
        }
    }
}

/// Kind-specific payload of a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlDetail {
    Enumerated {
        /// Option index → label, in declaration order.
        items: BTreeMap<usize, String>,
        /// Selected option indices.
        values: Vec<usize>,
    },
    Boolean {
        /// One entry per `[on]`/`[off]` marker, in report order.
        values: Vec<bool>,
    },
    Integer {
        min: i64,
        max: i64,
        /// Per-channel percentages. Always the same length as `channels`.
        channels: Vec<String>,
        values: Vec<u32>,
    },
    Other {
        token: String,
    },
}

/// One simple mixer control as exposed to API clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// Position in the parse pass that produced this control.
    pub id: usize,
    pub name: String,
    pub detail: ControlDetail,
}

impl Control {
    pub fn kind(&self) -> ControlKind {
        match &self.detail {
            ControlDetail::Enumerated { .. } => ControlKind::Enumerated,
            ControlDetail::Boolean { .. } => ControlKind::Boolean,
            ControlDetail::Integer { .. } => ControlKind::Integer,
            ControlDetail::Other { token } => ControlKind::Other(token.clone()),
        }
    }
}

/// Serialized with the field layout the web UI expects. Integer channel
/// values go out as decimal strings.
impl Serialize for Control {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("iface", IFACE_MIXER)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", self.kind().as_str())?;
        map.serialize_entry("access", ACCESS_READ_WRITE)?;

        match &self.detail {
            ControlDetail::Enumerated { items, values } => {
                map.serialize_entry("items", items)?;
                map.serialize_entry("values", values)?;
            }
            ControlDetail::Boolean { values } => {
                map.serialize_entry("values", values)?;
            }
            ControlDetail::Integer {
                min,
                max,
                channels,
                values,
            } => {
                let percents: Vec<String> = values.iter().map(u32::to_string).collect();
                map.serialize_entry("min", min)?;
                map.serialize_entry("max", max)?;
                map.serialize_entry("step", &0)?;
                map.serialize_entry("channels", channels)?;
                map.serialize_entry("values", &percents)?;
            }
            ControlDetail::Other { .. } => {}
        }

        map.end()
    }
}
