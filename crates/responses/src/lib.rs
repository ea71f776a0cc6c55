//! Typed shapes of the node RPC and application API responses.
//!
//! Every type maps one wire shape. Decoding never fails because a field is missing or `null`;
//! such fields take their zero value. Numeric values the API sends as strings stay strings.
#![allow(missing_docs)]
#![allow(clippy::uninlined_format_args)]

pub mod bank;
pub mod block;
mod decode;
pub mod gov;
pub mod mempool;
pub mod net_info;
pub mod node_info;
pub mod shape;
pub mod staking;
pub mod status;
pub mod validators;

pub use bank::{AccountBalances, Coin, CoinsResp, OutstandingRewards};
pub use block::{BlockResp, LatestBlock};
pub use decode::{DecodeError, Response, decode};
pub use gov::{Deposits, ProposalVotes, Proposals};
pub use mempool::UnconfirmedTxs;
pub use net_info::NetInfo;
pub use node_info::ApplicationInfo;
pub use shape::Polymorphic;
pub use staking::{SelfDelegation, ValidatorResp};
pub use status::{NodeStatus, RpcStatus};
pub use validators::{SetMember, ValidatorSet};
