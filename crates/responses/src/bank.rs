//! Coin lists: account balances and outstanding rewards.
use serde::{Deserialize, Serialize};

use crate::decode::{Response, nullable};

/// An amount of one denomination. Amounts may be decimal strings for rewards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    #[serde(default)]
    pub denom: String,
    pub amount: String,
}

/// `{height, result: [coin]}` as returned by `/bank/balances/{account}` and
/// `/distribution/validators/{operator}/outstanding_rewards`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinsResp {
    pub height: String,
    #[serde(deserialize_with = "nullable")]
    pub result: Vec<Coin>,
}

impl Response for CoinsResp {}

impl CoinsResp {
    /// Amount held in `denom`, if listed.
    pub fn amount_of(&self, denom: &str) -> Option<&str> {
        self.result.iter().find(|c| c.denom == denom).map(|c| c.amount.as_str())
    }
}

/// Account balance response.
pub type AccountBalances = CoinsResp;

/// Outstanding validator rewards response.
pub type OutstandingRewards = CoinsResp;
