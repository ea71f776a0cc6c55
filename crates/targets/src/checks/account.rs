//! Balance, self-delegation and reward metrics.
use chrono::{DateTime, Utc};
use eyre::Result;
use network::HttpOptions;
use responses::{AccountBalances, OutstandingRewards, SelfDelegation};

use super::{parse_amount, point};
use crate::{context::CheckContext, target::CheckKind};

pub(super) async fn account_balance(
    ctx: &CheckContext,
    http: HttpOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let http = http.with_suffix(&ctx.opts.validator.acc_address);
    let balances: AccountBalances = ctx.fetch(&http).await?;

    let points = balances
        .result
        .iter()
        .map(|coin| {
            point(ctx, "vcf_account_balance", now)
                .tag("denom", coin.denom.as_str())
                .field_opt("amount", parse_amount(&coin.amount))
        })
        .collect();
    ctx.record(CheckKind::AccountBalance.name(), points).await;
    Ok(())
}

pub(super) async fn self_delegation(
    ctx: &CheckContext,
    http: HttpOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let validator = &ctx.opts.validator;
    let http = http.with_suffix(&format!("{}/delegations/{}", validator.acc_address, validator.val_operator_addr));
    let delegation: SelfDelegation = ctx.fetch(&http).await?;

    ctx.record(
        CheckKind::SelfDelegation.name(),
        vec![
            point(ctx, "vcf_self_delegation", now)
                .field_opt("amount", parse_amount(delegation.amount()))
                .field_opt("shares", parse_amount(&delegation.result.shares)),
        ],
    )
    .await;
    Ok(())
}

pub(super) async fn rewards(ctx: &CheckContext, http: HttpOptions, now: DateTime<Utc>) -> Result<()> {
    let http = http.with_suffix(&format!("{}/outstanding_rewards", ctx.opts.validator.val_operator_addr));
    let rewards: OutstandingRewards = ctx.fetch(&http).await?;
    let denom = &ctx.opts.validator.staking_denom;

    ctx.record(
        CheckKind::Rewards.name(),
        vec![
            point(ctx, "vcf_outstanding_rewards", now)
                .tag("denom", denom.as_str())
                .field_opt("amount", rewards.amount_of(denom).and_then(parse_amount)),
        ],
    )
    .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        target::CheckKind,
        test_util::{ACCOUNT, Harness, VALOPER, at, float},
    };

    #[tokio::test]
    async fn balance_per_denom() {
        let mut h = Harness::new().await;
        h.server
            .mock("GET", format!("/bank/balances/{ACCOUNT}").as_str())
            .with_body(r#"{"height":"1","result":[{"denom":"uatom","amount":"1200"},{"denom":"ibc/ABC","amount":"3"}]}"#)
            .create_async()
            .await;

        h.run(CheckKind::AccountBalance, at(9, 0)).await.unwrap();

        let points = h.sink.points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].tags["denom"], "ibc/ABC");
        assert!((float(&points[0], "amount") - 1200.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn self_delegation_and_rewards() {
        let mut h = Harness::new().await;
        h.server
            .mock("GET", format!("/staking/delegators/{ACCOUNT}/delegations/{VALOPER}").as_str())
            .with_body(r#"{"result":{"shares":"5000.000000000000000000","balance":{"denom":"uatom","amount":"5000"}}}"#)
            .create_async()
            .await;
        h.server
            .mock("GET", format!("/distribution/validators/{VALOPER}/outstanding_rewards").as_str())
            .with_body(r#"{"result":[{"denom":"uatom","amount":"12.75"}]}"#)
            .create_async()
            .await;

        h.run(CheckKind::SelfDelegation, at(9, 0)).await.unwrap();
        h.run(CheckKind::Rewards, at(9, 0)).await.unwrap();

        let bond = h.sink.find("vcf_self_delegation").unwrap();
        assert!((float(&bond, "amount") - 5000.0).abs() < f64::EPSILON);
        assert!((float(&bond, "shares") - 5000.0).abs() < f64::EPSILON);
        let rewards = h.sink.find("vcf_outstanding_rewards").unwrap();
        assert!((float(&rewards, "amount") - 12.75).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn rpc_error_envelope_fails_tick() {
        let mut h = Harness::new().await;
        h.server
            .mock("GET", format!("/bank/balances/{ACCOUNT}").as_str())
            .with_body(r#"{"error":{"code":-32603,"message":"internal"}}"#)
            .create_async()
            .await;

        assert!(h.run(CheckKind::AccountBalance, at(9, 0)).await.is_err());
        assert!(h.sink.points().is_empty());
    }
}
