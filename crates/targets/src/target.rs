//! Target definitions and the registry built at startup.
use std::{fmt, time::Duration};

use config::Opts;
use network::HttpOptions;
use primitives::{Cadence, CadenceError};
use thiserror::Error;
use url::Url;

/// Registry construction failures. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two targets share a name.
    #[error("target `{0}` is already registered")]
    Duplicate(String),
    /// A cadence string could not be parsed.
    #[error("target `{target}` has an invalid cadence")]
    Cadence {
        /// Target name.
        target: String,
        /// Parse failure.
        #[source]
        source: CadenceError,
    },
    /// A target was selected by name but does not exist.
    #[error("unknown target `{0}`")]
    UnknownTarget(String),
}

/// Which surface a target talks to. Only used for labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionKind {
    /// Tendermint RPC.
    Rpc,
    /// Application REST API.
    Lcd,
}

impl ExecutionKind {
    /// Lower-case label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rpc => "rpc",
            Self::Lcd => "lcd",
        }
    }
}

impl fmt::Display for ExecutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of checks a target can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    /// Peer count and addresses.
    NetInfo,
    /// Height, sync state and voting power of the node.
    NodeStatus,
    /// Jail status report.
    ValidatorStatus,
    /// Height lag behind a reference node.
    NetworkHeight,
    /// Signature in the latest commit.
    MissedBlocks,
    /// Whether we proposed the latest block.
    LastProposedBlock,
    /// Presence in the active validator set.
    ValidatorSet,
    /// Mempool size.
    UnconfirmedTxs,
    /// Account balance.
    AccountBalance,
    /// Self-bonded stake.
    SelfDelegation,
    /// Outstanding validator rewards.
    Rewards,
    /// Governance proposals awaiting our vote.
    Proposals,
    /// Application version.
    NodeVersion,
}

impl CheckKind {
    /// Every check, in registry order.
    pub const ALL: [Self; 13] = [
        Self::NetInfo,
        Self::NodeStatus,
        Self::ValidatorStatus,
        Self::NetworkHeight,
        Self::MissedBlocks,
        Self::LastProposedBlock,
        Self::ValidatorSet,
        Self::UnconfirmedTxs,
        Self::AccountBalance,
        Self::SelfDelegation,
        Self::Rewards,
        Self::Proposals,
        Self::NodeVersion,
    ];

    /// Target name of this check.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NetInfo => "net-info",
            Self::NodeStatus => "node-status",
            Self::ValidatorStatus => "validator-status",
            Self::NetworkHeight => "network-height",
            Self::MissedBlocks => "missed-blocks",
            Self::LastProposedBlock => "last-proposed-block",
            Self::ValidatorSet => "validator-set",
            Self::UnconfirmedTxs => "unconfirmed-txs",
            Self::AccountBalance => "account-balance",
            Self::SelfDelegation => "self-delegation",
            Self::Rewards => "rewards",
            Self::Proposals => "proposals",
            Self::NodeVersion => "node-version",
        }
    }

    /// Look a check up by target name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Cadence used unless a global scrape rate is configured.
    pub const fn default_cadence(self) -> &'static str {
        match self {
            Self::MissedBlocks | Self::LastProposedBlock => "@every 3s",
            Self::NodeStatus | Self::NetworkHeight | Self::UnconfirmedTxs => "30s",
            Self::NetInfo | Self::ValidatorStatus | Self::ValidatorSet => "every 1m",
            Self::AccountBalance | Self::SelfDelegation | Self::Rewards => "@every 5m",
            Self::Proposals => "*/10 * * * *",
            Self::NodeVersion => "@hourly",
        }
    }

    /// Surface the check talks to.
    pub const fn execution_kind(self) -> ExecutionKind {
        match self {
            Self::NetInfo |
            Self::NodeStatus |
            Self::NetworkHeight |
            Self::MissedBlocks |
            Self::ValidatorSet |
            Self::UnconfirmedTxs => ExecutionKind::Rpc,
            Self::ValidatorStatus |
            Self::LastProposedBlock |
            Self::AccountBalance |
            Self::SelfDelegation |
            Self::Rewards |
            Self::Proposals |
            Self::NodeVersion => ExecutionKind::Lcd,
        }
    }

    /// Whether the check can send notifications.
    pub const fn alerts(self) -> bool {
        matches!(
            self,
            Self::NodeStatus |
                Self::ValidatorStatus |
                Self::NetworkHeight |
                Self::MissedBlocks |
                Self::ValidatorSet |
                Self::Proposals
        )
    }

    /// Base request options. Address path segments are appended at execution time.
    pub fn http_options(self, opts: &Opts) -> HttpOptions {
        let rpc = &opts.node.rpc_endpoint;
        let lcd = &opts.node.lcd_endpoint;
        let endpoint = match self {
            Self::NetInfo => join(rpc, "net_info"),
            Self::NodeStatus => join(rpc, "status"),
            Self::NetworkHeight => join(&opts.node.external_rpc, "status"),
            Self::MissedBlocks => join(rpc, "block"),
            Self::ValidatorSet => join(rpc, "validators"),
            Self::UnconfirmedTxs => join(rpc, "num_unconfirmed_txs"),
            Self::ValidatorStatus => join(lcd, "staking/validators/"),
            Self::LastProposedBlock => join(lcd, "blocks/latest"),
            Self::AccountBalance => join(lcd, "bank/balances/"),
            Self::SelfDelegation => join(lcd, "staking/delegators/"),
            Self::Rewards => join(lcd, "distribution/validators/"),
            Self::Proposals => join(lcd, "gov/proposals"),
            Self::NodeVersion => join(lcd, "node_info"),
        };
        HttpOptions::get(endpoint)
    }
}

/// `base` with `path` appended, without doubling the slash.
pub(crate) fn join(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path)
}

/// One named, scheduled check.
#[derive(Debug, Clone)]
pub struct Target {
    /// Unique name.
    pub name: String,
    /// Labelling tag.
    pub kind: ExecutionKind,
    /// Base request options, cloned for every execution.
    pub http_options: HttpOptions,
    /// Polling cadence.
    pub cadence: Cadence,
    /// What to do with the response.
    pub check: CheckKind,
}

impl Target {
    /// Target for `check` using its default name and endpoint.
    pub fn new(check: CheckKind, opts: &Opts, cadence: Cadence) -> Self {
        Self {
            name: check.name().to_owned(),
            kind: check.execution_kind(),
            http_options: check.http_options(opts),
            cadence,
            check,
        }
    }

    /// Interval between two executions.
    pub const fn interval(&self) -> Duration {
        self.cadence.interval()
    }
}

/// Targets in registration order.
#[derive(Debug, Clone, Default)]
pub struct Targets {
    list: Vec<Target>,
}

impl Targets {
    /// Add a target. Names must be unique.
    pub fn register(&mut self, target: Target) -> Result<(), RegistryError> {
        if self.list.iter().any(|t| t.name == target.name) {
            return Err(RegistryError::Duplicate(target.name));
        }
        self.list.push(target);
        Ok(())
    }

    /// All targets, in registration order.
    pub fn list(&self) -> &[Target] {
        &self.list
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Build the default registry, honouring the target selection and the
    /// global scrape rate override.
    pub fn from_opts(opts: &Opts) -> Result<Self, RegistryError> {
        let selected = opts
            .scrape
            .targets
            .iter()
            .map(|name| CheckKind::from_name(name).ok_or_else(|| RegistryError::UnknownTarget(name.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let mut targets = Self::default();
        for check in CheckKind::ALL {
            if !selected.is_empty() && !selected.contains(&check) {
                continue;
            }
            let spec = opts.scrape.scrape_rate.as_deref().unwrap_or_else(|| check.default_cadence());
            let cadence = spec
                .parse()
                .map_err(|source| RegistryError::Cadence { target: check.name().to_owned(), source })?;
            targets.register(Target::new(check, opts, cadence))?;
        }
        Ok(targets)
    }
}

impl<'a> IntoIterator for &'a Targets {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::opts;

    #[test]
    fn default_registry_has_every_check_in_order() {
        let targets = Targets::from_opts(&opts("http://rpc:26657", "http://lcd:1317/")).unwrap();
        let names: Vec<_> = targets.list().iter().map(|t| t.name.as_str()).collect();
        let expected: Vec<_> = CheckKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, expected);

        let status = &targets.list()[2];
        assert_eq!(status.check, CheckKind::ValidatorStatus);
        assert_eq!(status.kind, ExecutionKind::Lcd);
        assert_eq!(status.http_options.endpoint, "http://lcd:1317/staking/validators/");
        assert_eq!(status.interval(), Duration::from_secs(60));
        assert_eq!(targets.list()[1].http_options.endpoint, "http://rpc:26657/status");
    }

    #[test]
    fn every_default_cadence_parses() {
        for check in CheckKind::ALL {
            assert!(check.default_cadence().parse::<Cadence>().is_ok(), "{}", check.name());
        }
    }

    #[test]
    fn rejects_duplicates() {
        let o = opts("http://rpc", "http://lcd");
        let mut targets = Targets::default();
        targets.register(Target::new(CheckKind::NetInfo, &o, Cadence::every(Duration::from_secs(1)))).unwrap();
        let err = targets
            .register(Target::new(CheckKind::NetInfo, &o, Cadence::every(Duration::from_secs(2))))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(name) if name == "net-info"));
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn selection_and_scrape_rate_override() {
        let mut o = opts("http://rpc", "http://lcd");
        o.scrape.targets = vec!["validator-status".into(), "net-info".into()];
        o.scrape.scrape_rate = Some("@every 15s".into());
        let targets = Targets::from_opts(&o).unwrap();
        let names: Vec<_> = (&targets).into_iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["net-info", "validator-status"]);
        assert!(targets.list().iter().all(|t| t.interval() == Duration::from_secs(15)));
    }

    #[test]
    fn bad_cadence_and_unknown_target_fail() {
        let mut o = opts("http://rpc", "http://lcd");
        o.scrape.scrape_rate = Some("every fortnight".into());
        assert!(matches!(Targets::from_opts(&o), Err(RegistryError::Cadence { .. })));

        let mut o = opts("http://rpc", "http://lcd");
        o.scrape.targets = vec!["uptime".into()];
        assert!(matches!(Targets::from_opts(&o), Err(RegistryError::UnknownTarget(t)) if t == "uptime"));
    }
}
