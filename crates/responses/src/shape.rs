//! Fields whose wire shape differs between node types and versions.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use serde_json::value::RawValue;

use crate::decode::nullable;

/// A field that is one of several known shapes, or something we don't recognise.
///
/// Unrecognised values keep their raw JSON so they can be passed through untouched.
pub enum Polymorphic<K> {
    /// Field missing or `null`.
    Absent,
    /// Field matched the known shape.
    Known(K),
    /// Field present with an unknown shape.
    Opaque(Box<RawValue>),
}

impl<K> Polymorphic<K> {
    /// The decoded value, if the shape was recognised.
    pub const fn known(&self) -> Option<&K> {
        match self {
            Self::Known(k) => Some(k),
            _ => None,
        }
    }

    /// Raw JSON of an unrecognised value.
    pub fn opaque(&self) -> Option<&str> {
        match self {
            Self::Opaque(raw) => Some(raw.get()),
            _ => None,
        }
    }

    /// Whether the field was missing or `null`.
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<K> Default for Polymorphic<K> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<K: Clone> Clone for Polymorphic<K> {
    fn clone(&self) -> Self {
        match self {
            Self::Absent => Self::Absent,
            Self::Known(k) => Self::Known(k.clone()),
            Self::Opaque(raw) => Self::Opaque(raw.clone()),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Polymorphic<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Known(k) => f.debug_tuple("Known").field(k).finish(),
            Self::Opaque(raw) => f.debug_tuple("Opaque").field(&raw.get()).finish(),
        }
    }
}

impl<K: PartialEq> PartialEq for Polymorphic<K> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Absent, Self::Absent) => true,
            (Self::Known(a), Self::Known(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a.get() == b.get(),
            _ => false,
        }
    }
}

impl<'de, K: DeserializeOwned> Deserialize<'de> for Polymorphic<K> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let Some(raw) = Option::<Box<RawValue>>::deserialize(d)? else {
            return Ok(Self::Absent);
        };
        Ok(match serde_json::from_str::<K>(raw.get()) {
            Ok(known) => Self::Known(known),
            Err(_) => Self::Opaque(raw),
        })
    }
}

impl<K: Serialize> Serialize for Polymorphic<K> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent => s.serialize_none(),
            Self::Known(k) => k.serialize(s),
            Self::Opaque(raw) => raw.serialize(s),
        }
    }
}

/// Public key encodings used by Tendermint RPC and the application API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PubKey {
    /// Amino JSON: `{"type": "tendermint/PubKeyEd25519", "value": "..."}`.
    Amino {
        /// Key type URL.
        #[serde(rename = "type")]
        key_type: String,
        /// Base64 key bytes.
        value: String,
    },
    /// Protobuf `Any` JSON: `{"@type": "/cosmos.crypto.ed25519.PubKey", "key": "..."}`.
    Proto {
        /// Type URL.
        #[serde(rename = "@type")]
        key_type: String,
        /// Base64 key bytes.
        key: String,
    },
}

/// Per-peer flow statistics reported in `/net_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectionStatus {
    /// Connection age, nanoseconds as a string.
    pub duration: String,
    /// Outbound flow.
    #[serde(default)]
    pub send_monitor: FlowStatus,
    /// Inbound flow.
    #[serde(default)]
    pub recv_monitor: FlowStatus,
    /// Per-channel queues.
    #[serde(default, deserialize_with = "nullable")]
    pub channels: Vec<ChannelStatus>,
}

/// Flow monitor snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct FlowStatus {
    pub active: bool,
    pub start: String,
    pub bytes: String,
    pub samples: String,
    pub cur_rate: String,
    pub avg_rate: String,
    pub peak_rate: String,
    pub duration: String,
    pub idle: String,
}

/// Queue state of one p2p channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ChannelStatus {
    #[serde(rename = "ID")]
    pub id: i64,
    pub send_queue_capacity: String,
    pub send_queue_size: String,
    pub priority: String,
    pub recently_sent: String,
}

/// Final vote tally of a governance proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TallyResult {
    /// Pre-v0.46 field names.
    Legacy {
        /// Yes votes.
        yes: String,
        /// Abstentions.
        abstain: String,
        /// No votes.
        no: String,
        /// No-with-veto votes.
        no_with_veto: String,
    },
    /// v0.46+ field names.
    Counts {
        /// Yes votes.
        yes_count: String,
        /// Abstentions.
        abstain_count: String,
        /// No votes.
        no_count: String,
        /// No-with-veto votes.
        no_with_veto_count: String,
    },
}

impl TallyResult {
    /// Yes votes regardless of naming scheme.
    pub fn yes(&self) -> &str {
        match self {
            Self::Legacy { yes, .. } => yes,
            Self::Counts { yes_count, .. } => yes_count,
        }
    }

    /// No votes regardless of naming scheme.
    pub fn no(&self) -> &str {
        match self {
            Self::Legacy { no, .. } => no,
            Self::Counts { no_count, .. } => no_count,
        }
    }
}

/// Protocol versions advertised in `node_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub p2p: String,
    pub block: String,
    pub app: String,
}

/// Extra `node_info` data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOther {
    pub tx_index: String,
    pub rpc_address: String,
}

/// Block identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockId {
    /// Block hash, hex.
    pub hash: String,
}
