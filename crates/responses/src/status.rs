//! Tendermint `/status` responses.
use serde::{Deserialize, Serialize};

use crate::{
    decode::{Response, nullable},
    shape::{NodeOther, Polymorphic, ProtocolVersion, PubKey},
};

/// `node_info` block shared by `/status` and the application `node_info` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInfo {
    pub protocol_version: Polymorphic<ProtocolVersion>,
    pub id: String,
    pub listen_addr: String,
    pub network: String,
    pub version: String,
    pub channels: String,
    pub moniker: String,
    pub other: Polymorphic<NodeOther>,
}

/// Chain sync state of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncInfo {
    pub latest_block_hash: String,
    pub latest_app_hash: String,
    pub latest_block_height: String,
    pub latest_block_time: String,
    pub catching_up: bool,
}

/// The node's own validator key and power.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorInfo {
    pub address: String,
    pub pub_key: Polymorphic<PubKey>,
    pub voting_power: String,
}

/// Body of `/status`, also printed directly by the node CLI `status` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStatus {
    pub node_info: NodeInfo,
    pub sync_info: SyncInfo,
    pub validator_info: ValidatorInfo,
}

impl Response for NodeStatus {}

/// JSON-RPC envelope of `/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcStatus {
    pub jsonrpc: String,
    #[serde(deserialize_with = "nullable")]
    pub result: NodeStatus,
}

impl Response for RpcStatus {}

impl RpcStatus {
    /// Latest block height as reported, still a string.
    pub fn latest_height(&self) -> &str {
        &self.result.sync_info.latest_block_height
    }

    /// Whether the node reports it is still catching up.
    pub const fn catching_up(&self) -> bool {
        self.result.sync_info.catching_up
    }
}
