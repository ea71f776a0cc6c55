//! Checks against the node's own RPC surface.
use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use network::HttpOptions;
use responses::{ApplicationInfo, NetInfo, RpcStatus, UnconfirmedTxs};
use tracing::debug;

use super::{CheckState, alert, parse_int, point};
use crate::{context::CheckContext, target::{CheckKind, join}};

pub(super) async fn net_info(ctx: &CheckContext, http: HttpOptions, now: DateTime<Utc>) -> Result<()> {
    let info: NetInfo = ctx.fetch(&http).await?;
    let count = parse_int(&info.result.n_peers)
        .unwrap_or_else(|| i64::try_from(info.result.peers.len()).unwrap_or(i64::MAX));
    let addresses = info.peer_addresses().join(", ");

    ctx.record(
        CheckKind::NetInfo.name(),
        vec![
            point(ctx, "vcf_num_peers", now).field("count", count),
            point(ctx, "vcf_peer_addresses", now).field("addresses", addresses),
        ],
    )
    .await;
    Ok(())
}

pub(super) async fn node_status(
    ctx: &CheckContext,
    state: &mut CheckState,
    http: HttpOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let status: RpcStatus = ctx.fetch(&http).await?;
    let catching_up = status.catching_up();

    ctx.record(
        CheckKind::NodeStatus.name(),
        vec![
            point(ctx, "vcf_node_status", now)
                .field("catching_up", catching_up)
                .field_opt("height", parse_int(status.latest_height()))
                .field_opt("voting_power", parse_int(&status.result.validator_info.voting_power)),
        ],
    )
    .await;

    if catching_up {
        let message = format!(
            "Your validator node is not synced, it is catching up at height {}",
            status.latest_height()
        );
        alert(ctx, state, CheckKind::NodeStatus, now, &message).await;
    }
    Ok(())
}

pub(super) async fn network_height(
    ctx: &CheckContext,
    state: &mut CheckState,
    http: HttpOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let network: RpcStatus = ctx.fetch(&http).await.wrap_err("reference node status")?;
    let local: RpcStatus = ctx
        .fetch(&HttpOptions::get(join(&ctx.opts.node.rpc_endpoint, "status")))
        .await
        .wrap_err("validator node status")?;

    let (Some(network_height), Some(node_height)) =
        (parse_int(network.latest_height()), parse_int(local.latest_height()))
    else {
        debug!(network = network.latest_height(), node = local.latest_height(), "heights not reported");
        return Ok(());
    };
    let diff = network_height.saturating_sub(node_height);

    ctx.record(
        CheckKind::NetworkHeight.name(),
        vec![
            point(ctx, "vcf_block_height_diff", now)
                .field("diff", diff)
                .field("network_height", network_height)
                .field("node_height", node_height),
        ],
    )
    .await;

    let threshold = i64::try_from(ctx.opts.alert.block_diff_threshold).unwrap_or(i64::MAX);
    if diff > threshold {
        let message = format!(
            "Block difference between network and validator node is {diff}: network is at {network_height}, node at {node_height}"
        );
        alert(ctx, state, CheckKind::NetworkHeight, now, &message).await;
    }
    Ok(())
}

pub(super) async fn unconfirmed_txs(
    ctx: &CheckContext,
    http: HttpOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let txs: UnconfirmedTxs = ctx.fetch(&http).await?;
    ctx.record(
        CheckKind::UnconfirmedTxs.name(),
        vec![
            point(ctx, "vcf_unconfirmed_txns", now)
                .field_opt("count", parse_int(&txs.result.total))
                .field_opt("bytes", parse_int(&txs.result.total_bytes)),
        ],
    )
    .await;
    Ok(())
}

pub(super) async fn node_version(ctx: &CheckContext, http: HttpOptions, now: DateTime<Utc>) -> Result<()> {
    let info: ApplicationInfo = ctx.fetch(&http).await?;
    let version = &info.application_version;
    let mut p = point(ctx, "vcf_version", now).field("version", version.version.as_str());
    if !version.commit.is_empty() {
        p = p.field("commit", version.commit.as_str());
    }
    if let Some(node) = info.node_info.known() {
        p = p.tag("network", node.network.as_str());
    }
    ctx.record(CheckKind::NodeVersion.name(), vec![p]).await;
    Ok(())
}
