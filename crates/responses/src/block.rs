//! Block responses from the RPC (`/block`) and the application API (`/blocks/latest`).
use serde::{Deserialize, Serialize};

use crate::{
    decode::{Response, nullable},
    shape::{BlockId, Polymorphic},
};

/// Header fields we read from a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub chain_id: String,
    pub height: String,
    pub time: String,
    pub proposer_address: String,
}

/// One precommit signature of a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitSig {
    #[serde(deserialize_with = "nullable")]
    pub validator_address: String,
    #[serde(deserialize_with = "nullable")]
    pub signature: String,
}

/// Commit for the previous block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastCommit {
    #[serde(deserialize_with = "nullable")]
    pub signatures: Vec<CommitSig>,
}

impl LastCommit {
    /// Whether `validator_address` (hex, any case) has a non-empty signature in this commit.
    pub fn signed_by(&self, validator_address: &str) -> bool {
        self.signatures.iter().any(|s| {
            s.validator_address.eq_ignore_ascii_case(validator_address) && !s.signature.is_empty()
        })
    }
}

/// Block body fields we read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    pub header: Header,
    #[serde(deserialize_with = "nullable")]
    pub last_commit: LastCommit,
}

/// `result` of the RPC `/block` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockResult {
    pub block_id: Polymorphic<BlockId>,
    pub block: Block,
}

/// RPC `/block?height=N` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockResp {
    #[serde(deserialize_with = "nullable")]
    pub result: BlockResult,
}

impl Response for BlockResp {}

/// Application API `/blocks/latest` response, which has no `result` envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatestBlock {
    pub block_id: Polymorphic<BlockId>,
    pub block: Block,
}

impl Response for LatestBlock {}

impl LatestBlock {
    /// Whether `validator_address` (hex, any case) proposed this block.
    pub fn proposed_by(&self, validator_address: &str) -> bool {
        !validator_address.is_empty()
            && self.block.header.proposer_address.eq_ignore_ascii_case(validator_address)
    }
}
