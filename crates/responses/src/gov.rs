//! Governance responses: proposals, votes, deposits.
use serde::{Deserialize, Serialize};

use crate::{
    bank::Coin,
    decode::{Response, nullable},
    shape::{Polymorphic, TallyResult},
};

/// Proposal status string for proposals that accept votes.
pub const VOTING_PERIOD: &str = "VotingPeriod";

/// Title and description of a proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalText {
    pub title: String,
    pub description: String,
}

/// Typed proposal content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: ProposalText,
}

/// One governance proposal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Proposal {
    pub content: ProposalContent,
    pub id: String,
    pub proposal_status: String,
    pub final_tally_result: Polymorphic<TallyResult>,
    pub submit_time: String,
    pub deposit_end_time: String,
    #[serde(deserialize_with = "nullable")]
    pub total_deposit: Vec<Coin>,
    pub voting_start_time: String,
    pub voting_end_time: String,
}

impl Proposal {
    /// Whether votes can currently be cast.
    pub fn in_voting_period(&self) -> bool {
        self.proposal_status == VOTING_PERIOD
    }
}

/// `/gov/proposals` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Proposals {
    pub height: String,
    #[serde(deserialize_with = "nullable")]
    pub result: Vec<Proposal>,
}

impl Response for Proposals {}

/// A single vote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vote {
    pub proposal_id: String,
    pub voter: String,
    pub option: String,
}

/// `/gov/proposals/{id}/votes` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalVotes {
    pub height: String,
    #[serde(deserialize_with = "nullable")]
    pub result: Vec<Vote>,
}

impl Response for ProposalVotes {}

impl ProposalVotes {
    /// The vote cast by `voter`, if any.
    pub fn vote_of(&self, voter: &str) -> Option<&Vote> {
        self.result.iter().find(|v| v.voter == voter)
    }
}

/// A single deposit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deposit {
    pub proposal_id: String,
    pub depositor: String,
    #[serde(deserialize_with = "nullable")]
    pub amount: Vec<Coin>,
}

/// `/gov/proposals/{id}/deposits` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deposits {
    pub height: String,
    #[serde(deserialize_with = "nullable")]
    pub result: Vec<Deposit>,
}

impl Response for Deposits {}
