//! Tendermint `/num_unconfirmed_txs` and `/unconfirmed_txs` responses.
use serde::{Deserialize, Serialize};

use crate::decode::{Response, nullable};

/// Mempool statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnconfirmedTxsResult {
    pub n_txs: String,
    pub total: String,
    pub total_bytes: String,
    /// Base64 transactions. Null on `/num_unconfirmed_txs`.
    #[serde(deserialize_with = "nullable")]
    pub txs: Vec<String>,
}

/// Mempool response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnconfirmedTxs {
    pub jsonrpc: String,
    #[serde(deserialize_with = "nullable")]
    pub result: UnconfirmedTxsResult,
}

impl Response for UnconfirmedTxs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_counts_with_null_txs() {
        let body = r#"{"jsonrpc":"2.0","result":{"n_txs":"3","total":"17","total_bytes":"4096","txs":null}}"#;
        let resp = UnconfirmedTxs::decode(body.as_bytes()).unwrap();
        assert_eq!(resp.result.total, "17");
        assert_eq!(resp.result.total_bytes, "4096");
        assert!(resp.result.txs.is_empty());
    }

    #[test]
    fn decodes_tx_list() {
        let body = r#"{"result":{"n_txs":"1","txs":["CpIBCo8B"]}}"#;
        let resp = UnconfirmedTxs::decode(body.as_bytes()).unwrap();
        assert_eq!(resp.result.txs, vec!["CpIBCo8B".to_owned()]);
        assert_eq!(resp.result.total, "");
    }
}
