//! Tendermint `/net_info` response.
use serde::{Deserialize, Serialize};

use crate::{
    decode::{Response, nullable},
    shape::{ConnectionStatus, Polymorphic},
};

/// Subset of a peer's `node_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerNodeInfo {
    pub id: String,
    pub moniker: String,
    pub network: String,
}

/// A connected peer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Peer {
    pub remote_ip: String,
    pub connection_status: Polymorphic<ConnectionStatus>,
    pub is_outbound: bool,
    pub node_info: PeerNodeInfo,
}

/// `result` of `/net_info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetInfoResult {
    pub listening: bool,
    #[serde(deserialize_with = "nullable")]
    pub listeners: Vec<String>,
    pub n_peers: String,
    #[serde(deserialize_with = "nullable")]
    pub peers: Vec<Peer>,
}

/// `/net_info` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetInfo {
    pub jsonrpc: String,
    #[serde(deserialize_with = "nullable")]
    pub result: NetInfoResult,
}

impl Response for NetInfo {}

impl NetInfo {
    /// Remote IPs of all connected peers.
    pub fn peer_addresses(&self) -> Vec<&str> {
        self.result.peers.iter().map(|p| p.remote_ip.as_str()).collect()
    }
}
