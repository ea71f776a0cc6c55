//! Tendermint `/validators` response.
use serde::{Deserialize, Serialize};

use crate::{
    decode::{Response, nullable},
    shape::{Polymorphic, PubKey},
};

/// One member of the consensus validator set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetMember {
    pub address: String,
    pub pub_key: Polymorphic<PubKey>,
    pub voting_power: String,
    pub proposer_priority: String,
}

/// `result` of `/validators`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSetResult {
    pub block_height: String,
    #[serde(deserialize_with = "nullable")]
    pub validators: Vec<SetMember>,
    pub count: String,
    pub total: String,
}

/// `/validators?height=N` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSet {
    pub jsonrpc: String,
    #[serde(deserialize_with = "nullable")]
    pub result: ValidatorSetResult,
}

impl Response for ValidatorSet {}

impl ValidatorSet {
    /// The set member with hex address `address`, compared case-insensitively.
    pub fn member(&self, address: &str) -> Option<&SetMember> {
        self.result.validators.iter().find(|v| v.address.eq_ignore_ascii_case(address))
    }

    /// Size of the whole set across all pages, when the node reports it.
    pub fn total(&self) -> Option<usize> {
        self.result.total.trim().parse().ok()
    }
}
