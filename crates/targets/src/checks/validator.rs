//! Checks about the validator itself: jail status, signatures, proposals and set membership.
use chrono::{DateTime, Utc};
use eyre::{Result, bail};
use network::HttpOptions;
use responses::{BlockResp, LatestBlock, SetMember, ValidatorResp, ValidatorSet};
use tracing::{debug, info};

use super::{CheckState, alert, parse_amount, parse_int, point};
use crate::{context::CheckContext, target::CheckKind};

/// Status report sent while the validator is active.
pub const VOTING_MESSAGE: &str = "Your validator is currently voting";
/// Status report sent while the validator is jailed.
pub const JAILED_MESSAGE: &str = "Your validator is in jailed status";

/// Message for the daily status report.
pub const fn status_message(jailed: bool) -> &'static str {
    if jailed { JAILED_MESSAGE } else { VOTING_MESSAGE }
}

pub(super) async fn validator_status(
    ctx: &CheckContext,
    state: &mut CheckState,
    http: HttpOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let http = http.with_suffix(&ctx.opts.validator.val_operator_addr);
    let resp: ValidatorResp = ctx.fetch(&http).await?;
    let validator = &resp.result;

    ctx.record(
        CheckKind::ValidatorStatus.name(),
        vec![
            point(ctx, "vcf_validator_status", now)
                .field("jailed", validator.jailed)
                .field_opt("tokens", parse_amount(&validator.tokens))
                .field_opt("delegator_shares", parse_amount(&validator.delegator_shares))
                .field_opt(
                    "commission_rate",
                    parse_amount(&validator.commission.commission_rates.rate),
                ),
        ],
    )
    .await;

    alert(ctx, state, CheckKind::ValidatorStatus, now, status_message(validator.jailed)).await;
    Ok(())
}

pub(super) async fn missed_blocks(
    ctx: &CheckContext,
    state: &mut CheckState,
    http: HttpOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let resp: BlockResp = ctx.fetch(&http).await?;
    let block = &resp.result.block;
    let Some(height) = parse_int(&block.header.height).and_then(|h| u64::try_from(h).ok()) else {
        debug!(height = %block.header.height, "block without height");
        return Ok(());
    };
    if state.last_height.is_some_and(|last| last >= height) {
        return Ok(());
    }
    state.last_height = Some(height);

    let signed = block.last_commit.signed_by(&ctx.opts.validator.validator_hex_addr);
    state.missed_streak = if signed { 0 } else { state.missed_streak + 1 };

    ctx.record(
        CheckKind::MissedBlocks.name(),
        vec![
            point(ctx, "vcf_missed_blocks", now)
                .field("signed", signed)
                .field("streak", i64::try_from(state.missed_streak).unwrap_or(i64::MAX))
                .field("height", i64::try_from(height).unwrap_or(i64::MAX)),
        ],
    )
    .await;

    if state.missed_streak >= ctx.opts.alert.missed_blocks_threshold {
        let message = format!(
            "Your validator missed {} consecutive blocks, last checked height {height}",
            state.missed_streak
        );
        alert(ctx, state, CheckKind::MissedBlocks, now, &message).await;
    }
    Ok(())
}

pub(super) async fn last_proposed_block(
    ctx: &CheckContext,
    http: HttpOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let latest: LatestBlock = ctx.fetch(&http).await?;
    if !latest.proposed_by(&ctx.opts.validator.validator_hex_addr) {
        return Ok(());
    }

    let header = &latest.block.header;
    info!(height = %header.height, "validator proposed the latest block");
    ctx.record(
        CheckKind::LastProposedBlock.name(),
        vec![
            point(ctx, "vcf_last_proposed_block", now)
                .field_opt("height", parse_int(&header.height))
                .field("block_time", header.time.as_str()),
        ],
    )
    .await;
    Ok(())
}

/// Page size requested from `/validators`. Tendermint caps it at 100.
const VALIDATORS_PER_PAGE: usize = 100;
/// Upper bound on pages fetched in one tick.
const MAX_VALIDATOR_PAGES: usize = 50;

/// Walk `/validators` page by page until our address is found or the whole set
/// was seen. Returns the set height and our entry.
async fn find_in_validator_set(
    ctx: &CheckContext,
    http: &HttpOptions,
) -> Result<(String, Option<SetMember>)> {
    let address = &ctx.opts.validator.validator_hex_addr;
    let mut http = http.with_query("per_page", VALIDATORS_PER_PAGE.to_string());
    let mut height = String::new();
    let mut seen = 0;

    for page in 1..=MAX_VALIDATOR_PAGES {
        let set: ValidatorSet = ctx.fetch(&http.with_query("page", page.to_string())).await?;
        if page == 1 {
            height = set.result.block_height.clone();
            if !height.is_empty() {
                // later pages must describe the same set
                http = http.with_query("height", height.as_str());
            }
        }
        if let Some(member) = set.member(address) {
            return Ok((height, Some(member.clone())));
        }

        let fetched = set.result.validators.len();
        seen += fetched;
        let complete = match set.total() {
            Some(total) => seen >= total,
            None => fetched < VALIDATORS_PER_PAGE,
        };
        if complete {
            return Ok((height, None));
        }
        if fetched == 0 {
            bail!("validator set paging stopped after {seen} of {:?} validators", set.total());
        }
    }
    bail!("validator set has more than {MAX_VALIDATOR_PAGES} pages")
}

pub(super) async fn validator_set(
    ctx: &CheckContext,
    state: &mut CheckState,
    http: HttpOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let (height, member) = find_in_validator_set(ctx, &http).await?;

    ctx.record(
        CheckKind::ValidatorSet.name(),
        vec![
            point(ctx, "vcf_validator_set", now)
                .field("active", member.is_some())
                .field_opt("voting_power", member.as_ref().and_then(|m| parse_int(&m.voting_power))),
        ],
    )
    .await;

    if member.is_none() {
        let message = format!("Your validator is not in the active validator set at height {height}");
        alert(ctx, state, CheckKind::ValidatorSet, now, &message).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    use crate::test_util::{CHAT_PATH, HEX, Harness, VALOPER, at, boolean, float, int, silent_server};
    use influx::InfluxWriter;
    use mockito::Matcher;

    fn block(height: u64, signer: &str) -> String {
        format!(
            r#"{{"result":{{"block":{{"header":{{"height":"{height}"}},"last_commit":{{"signatures":[{{"validator_address":"{signer}","signature":"c2ln"}}]}}}}}}}}"#
        )
    }

    #[test]
    fn templates() {
        assert_eq!(status_message(false), "Your validator is currently voting");
        assert_eq!(status_message(true), "Your validator is in jailed status");
    }

    #[tokio::test]
    async fn jailed_validator_reports_jailed_template() {
        let mut h = Harness::new().await;
        h.server
            .mock("GET", format!("/staking/validators/{VALOPER}").as_str())
            .with_body(r#"{"height":"5","result":{"jailed":true,"tokens":"1500000","commission":{"commission_rates":{"rate":"0.050000000000000000"}}}}"#)
            .create_async()
            .await;
        let chat = h
            .server
            .mock("POST", CHAT_PATH)
            .match_body(Matcher::PartialJsonString(format!(r#"{{"text":"{JAILED_MESSAGE}"}}"#)))
            .with_body(r#"{"ok":true}"#)
            .expect(1)
            .create_async()
            .await;

        h.run(CheckKind::ValidatorStatus, at(2, 0)).await.unwrap();

        let p = h.sink.find("vcf_validator_status").unwrap();
        assert!(boolean(&p, "jailed"));
        assert!((float(&p, "tokens") - 1_500_000.0).abs() < f64::EPSILON);
        assert!((float(&p, "commission_rate") - 0.05).abs() < 1e-9);
        chat.assert_async().await;
    }

    #[tokio::test]
    async fn hung_metrics_write_does_not_block_alert() {
        let mut h = Harness::new().await;
        h.server
            .mock("GET", format!("/staking/validators/{VALOPER}").as_str())
            .with_body(r#"{"result":{"jailed":false}}"#)
            .create_async()
            .await;
        let chat = h.server.mock("POST", CHAT_PATH).with_body(r#"{"ok":true}"#).expect(1).create_async().await;

        let writer = InfluxWriter::new(silent_server().await.parse().unwrap(), "vcf".into(), None, None)
            .unwrap()
            .with_timeout(Duration::from_millis(100));
        let ctx = CheckContext::new(
            Arc::clone(&h.ctx.opts),
            h.ctx.probe.clone(),
            Arc::new(writer),
            Arc::clone(&h.ctx.notifier),
        )
        .unwrap();
        let target = h.target(CheckKind::ValidatorStatus);

        let tick = crate::checks::execute(&target, &ctx, &mut h.state, at(2, 0));
        let res = tokio::time::timeout(Duration::from_secs(10), tick).await;

        assert!(matches!(res, Ok(Ok(()))), "tick did not finish: {res:?}");
        chat.assert_async().await;
    }

    #[tokio::test]
    async fn window_survives_failed_delivery() {
        let mut h = Harness::new().await;
        h.server
            .mock("GET", format!("/staking/validators/{VALOPER}").as_str())
            .with_body(r#"{"result":{"jailed":false}}"#)
            .create_async()
            .await;
        let down = h.server.mock("POST", CHAT_PATH).with_status(500).expect(1).create_async().await;

        h.run(CheckKind::ValidatorStatus, at(2, 0)).await.unwrap();
        down.assert_async().await;
        down.remove_async().await;
        assert!(h.state.alerts.is_open(at(2, 1)));

        let up = h.server.mock("POST", CHAT_PATH).with_body(r#"{"ok":true}"#).expect(1).create_async().await;
        h.run(CheckKind::ValidatorStatus, at(2, 1)).await.unwrap();
        h.run(CheckKind::ValidatorStatus, at(2, 2)).await.unwrap();

        up.assert_async().await;
        assert!(!h.state.alerts.is_open(at(2, 3)));
    }

    #[tokio::test]
    async fn missed_streak_counts_new_heights_only() {
        let mut h = Harness::with_opts(|o| o.alert.missed_blocks_threshold = 2).await;
        let chat = h
            .server
            .mock("POST", CHAT_PATH)
            .match_body(Matcher::Regex("missed 2 consecutive blocks".into()))
            .with_body(r#"{"ok":true}"#)
            .expect(1)
            .create_async()
            .await;

        let first = h.server.mock("GET", "/block").with_body(block(100, "FFFF")).create_async().await;
        h.run(CheckKind::MissedBlocks, at(2, 0)).await.unwrap();
        // same height again is ignored
        h.run(CheckKind::MissedBlocks, at(2, 0)).await.unwrap();
        assert_eq!(h.state.missed_streak, 1);
        first.remove_async().await;

        let second = h.server.mock("GET", "/block").with_body(block(101, "ffff")).create_async().await;
        h.run(CheckKind::MissedBlocks, at(2, 1)).await.unwrap();
        assert_eq!(h.state.missed_streak, 2);
        second.remove_async().await;

        h.server.mock("GET", "/block").with_body(block(102, &HEX.to_lowercase())).create_async().await;
        h.run(CheckKind::MissedBlocks, at(2, 2)).await.unwrap();
        assert_eq!(h.state.missed_streak, 0);

        let last = h.sink.points().into_iter().last().unwrap();
        assert!(boolean(&last, "signed"));
        assert_eq!(int(&last, "height"), 102);
        chat.assert_async().await;
    }

    #[tokio::test]
    async fn proposer_is_recorded() {
        let mut h = Harness::new().await;
        h.server
            .mock("GET", "/blocks/latest")
            .with_body(format!(
                r#"{{"block":{{"header":{{"height":"77","time":"2024-03-01T09:00:00Z","proposer_address":"{HEX}"}}}}}}"#
            ))
            .create_async()
            .await;

        h.run(CheckKind::LastProposedBlock, at(9, 0)).await.unwrap();
        assert_eq!(int(&h.sink.find("vcf_last_proposed_block").unwrap(), "height"), 77);
    }

    #[tokio::test]
    async fn other_proposer_is_ignored() {
        let mut h = Harness::new().await;
        h.server
            .mock("GET", "/blocks/latest")
            .with_body(r#"{"block":{"header":{"height":"77","proposer_address":"0000"}}}"#)
            .create_async()
            .await;

        h.run(CheckKind::LastProposedBlock, at(9, 0)).await.unwrap();
        assert!(h.sink.points().is_empty());
    }

    fn validator_page(height: u64, addresses: &[&str], total: usize) -> String {
        let validators: Vec<String> = addresses
            .iter()
            .map(|a| format!(r#"{{"address":"{a}","voting_power":"10"}}"#))
            .collect();
        format!(
            r#"{{"result":{{"block_height":"{height}","validators":[{}],"count":"{}","total":"{total}"}}}}"#,
            validators.join(","),
            addresses.len()
        )
    }

    #[tokio::test]
    async fn absence_from_validator_set_alerts() {
        let mut h = Harness::new().await;
        h.server
            .mock("GET", "/validators")
            .match_query(Matcher::Any)
            .with_body(validator_page(9, &["0000"], 1))
            .create_async()
            .await;
        let chat = h.server.mock("POST", CHAT_PATH).with_body(r#"{"ok":true}"#).expect(1).create_async().await;

        h.run(CheckKind::ValidatorSet, at(14, 30)).await.unwrap();

        assert!(!boolean(&h.sink.find("vcf_validator_set").unwrap(), "active"));
        chat.assert_async().await;
    }

    #[tokio::test]
    async fn member_on_later_page_is_found() {
        let mut h = Harness::new().await;
        let first = h
            .server
            .mock("GET", "/validators")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
            ]))
            .with_body(validator_page(9, &["0000", "1111"], 3))
            .create_async()
            .await;
        let second = h
            .server
            .mock("GET", "/validators")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("height".into(), "9".into()),
            ]))
            .with_body(validator_page(9, &[HEX], 3))
            .create_async()
            .await;
        let chat = h.server.mock("POST", CHAT_PATH).expect(0).create_async().await;

        h.run(CheckKind::ValidatorSet, at(14, 30)).await.unwrap();

        let p = h.sink.find("vcf_validator_set").unwrap();
        assert!(boolean(&p, "active"));
        assert_eq!(int(&p, "voting_power"), 10);
        first.assert_async().await;
        second.assert_async().await;
        chat.assert_async().await;
    }

    #[tokio::test]
    async fn incomplete_paging_fails_tick_without_alert() {
        let mut h = Harness::new().await;
        let others: Vec<String> = (0..30).map(|i| format!("{i:04X}FF")).collect();
        let others: Vec<&str> = others.iter().map(String::as_str).collect();
        h.server
            .mock("GET", "/validators")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_body(validator_page(9, &others, 180))
            .create_async()
            .await;
        h.server
            .mock("GET", "/validators")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(validator_page(9, &[], 180))
            .create_async()
            .await;
        let chat = h.server.mock("POST", CHAT_PATH).expect(0).create_async().await;

        assert!(h.run(CheckKind::ValidatorSet, at(14, 30)).await.is_err());

        assert!(h.sink.find("vcf_validator_set").is_none());
        chat.assert_async().await;
    }
}
