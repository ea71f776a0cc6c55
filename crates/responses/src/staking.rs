//! Staking module responses from the application API.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::{
    bank::Coin,
    decode::{Response, nullable},
    shape::Polymorphic,
};

/// Bonding state of a validator.
///
/// Legacy API versions send an integer, newer ones a `BOND_STATUS_*` string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BondStatus {
    /// Not reported.
    #[default]
    Unspecified,
    /// Not in the active set.
    Unbonded,
    /// Leaving the active set.
    Unbonding,
    /// In the active set.
    Bonded,
}

impl<'de> Deserialize<'de> for BondStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = BondStatus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a bond status integer or BOND_STATUS_* string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(match v {
                    0 => BondStatus::Unbonded,
                    1 => BondStatus::Unbonding,
                    2 => BondStatus::Bonded,
                    _ => BondStatus::Unspecified,
                })
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v).map_or(Ok(BondStatus::Unspecified), |v| self.visit_u64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(match v {
                    "BOND_STATUS_BONDED" | "Bonded" => BondStatus::Bonded,
                    "BOND_STATUS_UNBONDING" | "Unbonding" => BondStatus::Unbonding,
                    "BOND_STATUS_UNBONDED" | "Unbonded" => BondStatus::Unbonded,
                    _ => BondStatus::Unspecified,
                })
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(BondStatus::Unspecified)
            }
        }

        d.deserialize_any(Visitor)
    }
}

/// Validator self-description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Description {
    pub moniker: String,
    pub identity: String,
    pub website: String,
    pub details: String,
}

/// Commission rates, decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionRates {
    pub rate: String,
    pub max_rate: String,
    pub max_change_rate: String,
}

/// Commission settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commission {
    pub commission_rates: CommissionRates,
    pub update_time: String,
}

/// A validator as returned by `/staking/validators/{operator}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Validator {
    pub operator_address: String,
    pub jailed: bool,
    pub status: BondStatus,
    pub tokens: String,
    pub delegator_shares: String,
    pub description: Description,
    pub unbonding_height: String,
    pub unbonding_time: String,
    pub commission: Commission,
    pub min_self_delegation: String,
}

/// `/staking/validators/{operator}` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorResp {
    pub height: String,
    #[serde(deserialize_with = "nullable")]
    pub result: Validator,
}

impl Response for ValidatorResp {}

/// Self-bond amount: a bare integer string on old APIs, a coin on newer ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DelegationBalance {
    /// Plain amount.
    Amount(String),
    /// Amount with denomination.
    Coin(Coin),
}

impl DelegationBalance {
    /// Amount without denomination.
    pub fn amount(&self) -> &str {
        match self {
            Self::Amount(a) => a,
            Self::Coin(c) => &c.amount,
        }
    }
}

/// Delegation entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delegation {
    pub delegator_address: String,
    pub validator_address: String,
    pub shares: String,
    pub balance: Polymorphic<DelegationBalance>,
}

/// `/staking/delegators/{account}/delegations/{operator}` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfDelegation {
    pub height: String,
    #[serde(deserialize_with = "nullable")]
    pub result: Delegation,
}

impl Response for SelfDelegation {}

impl SelfDelegation {
    /// Self-bonded amount, empty when not reported.
    pub fn amount(&self) -> &str {
        self.result.balance.known().map(DelegationBalance::amount).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeError;

    #[test]
    fn decodes_validator() {
        let body = r#"{
            "height": "100",
            "result": {
                "operator_address": "cosmosvaloper1abc",
                "consensus_pubkey": "cosmosvalconspub1xyz",
                "jailed": true,
                "status": 2,
                "tokens": "1000000",
                "delegator_shares": "1000000.000000000000000000",
                "description": {"moniker": "val", "website": "https://example.com"},
                "commission": {
                    "commission_rates": {"rate": "0.050000000000000000", "max_rate": "0.2", "max_change_rate": "0.01"},
                    "update_time": "2021-01-01T00:00:00Z"
                },
                "min_self_delegation": "1"
            }
        }"#;
        let resp = ValidatorResp::decode(body.as_bytes()).unwrap();
        assert!(resp.result.jailed);
        assert_eq!(resp.result.status, BondStatus::Bonded);
        assert_eq!(resp.result.commission.commission_rates.rate, "0.050000000000000000");
        assert_eq!(resp.result.description.moniker, "val");
        assert_eq!(resp.result.unbonding_height, "");
    }

    #[test]
    fn bond_status_accepts_strings_and_null() {
        let resp = ValidatorResp::decode(br#"{"result":{"status":"BOND_STATUS_UNBONDING"}}"#).unwrap();
        assert_eq!(resp.result.status, BondStatus::Unbonding);

        let resp = ValidatorResp::decode(br#"{"result":{"status":null}}"#).unwrap();
        assert_eq!(resp.result.status, BondStatus::Unspecified);
    }

    #[test]
    fn minimal_validator_is_not_jailed() {
        let resp = ValidatorResp::decode(br#"{"result":{"jailed":false}}"#).unwrap();
        assert!(!resp.result.jailed);
        assert_eq!(resp.height, "");
    }

    #[test]
    fn jailed_must_be_bool() {
        assert!(matches!(
            ValidatorResp::decode(br#"{"result":{"jailed":"yes"}}"#),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn self_delegation_balance_shapes() {
        let legacy = SelfDelegation::decode(br#"{"height":"1","result":{"balance":"5000"}}"#).unwrap();
        assert_eq!(legacy.amount(), "5000");

        let coin = SelfDelegation::decode(
            br#"{"result":{"balance":{"denom":"uatom","amount":"7000"},"shares":"7000.0"}}"#,
        )
        .unwrap();
        assert_eq!(coin.amount(), "7000");

        let missing = SelfDelegation::decode(br#"{"result":{}}"#).unwrap();
        assert_eq!(missing.amount(), "");
    }
}
