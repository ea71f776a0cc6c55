//! Governance participation.
use chrono::{DateTime, Utc};
use eyre::Result;
use network::HttpOptions;
use responses::{ProposalVotes, Proposals};
use tracing::warn;

use super::{CheckState, alert, point};
use crate::{context::CheckContext, target::CheckKind};

pub(super) async fn proposals(
    ctx: &CheckContext,
    state: &mut CheckState,
    http: HttpOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let proposals: Proposals = ctx.fetch(&http).await?;
    let voter = &ctx.opts.validator.acc_address;

    let mut points = Vec::new();
    let mut pending = Vec::new();
    for proposal in proposals.result.iter().filter(|p| p.in_voting_period()) {
        let votes_http = http.with_suffix(&format!("/{}/votes", proposal.id));
        let voted = match ctx.fetch::<ProposalVotes>(&votes_http).await {
            Ok(votes) => votes.vote_of(voter).is_some(),
            Err(e) => {
                warn!(proposal = %proposal.id, err = %e, "could not fetch votes");
                continue;
            }
        };

        points.push(
            point(ctx, "vcf_proposals", now)
                .tag("proposal_id", proposal.id.as_str())
                .field("voted", voted)
                .field("title", proposal.content.value.title.as_str())
                .field("voting_end_time", proposal.voting_end_time.as_str()),
        );
        if !voted {
            pending.push(format!("#{} {}", proposal.id, proposal.content.value.title));
        }
    }
    ctx.record(CheckKind::Proposals.name(), points).await;

    if !pending.is_empty() {
        let message = format!("Proposals awaiting your vote: {}", pending.join(", "));
        alert(ctx, state, CheckKind::Proposals, now, &message).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        target::CheckKind,
        test_util::{ACCOUNT, CHAT_PATH, Harness, at, boolean},
    };
    use mockito::Matcher;

    const PROPOSALS: &str = r#"{"result":[
        {"id":"12","proposal_status":"VotingPeriod","content":{"type":"cosmos-sdk/TextProposal","value":{"title":"Upgrade"}}},
        {"id":"13","proposal_status":"VotingPeriod","content":{"value":{"title":"Community pool spend"}}},
        {"id":"9","proposal_status":"Passed","content":{"value":{"title":"Old"}}}
    ]}"#;

    #[tokio::test]
    async fn lists_unvoted_proposals() {
        let mut h = Harness::new().await;
        h.server.mock("GET", "/gov/proposals").with_body(PROPOSALS).create_async().await;
        h.server
            .mock("GET", "/gov/proposals/12/votes")
            .with_body(format!(r#"{{"result":[{{"proposal_id":"12","voter":"{ACCOUNT}","option":"Yes"}}]}}"#))
            .create_async()
            .await;
        h.server.mock("GET", "/gov/proposals/13/votes").with_body(r#"{"result":null}"#).create_async().await;
        let old = h.server.mock("GET", "/gov/proposals/9/votes").expect(0).create_async().await;
        let chat = h
            .server
            .mock("POST", CHAT_PATH)
            .match_body(Matcher::PartialJsonString(
                r##"{"text":"Proposals awaiting your vote: #13 Community pool spend"}"##.into(),
            ))
            .with_body(r#"{"ok":true}"#)
            .expect(1)
            .create_async()
            .await;

        h.run(CheckKind::Proposals, at(14, 0)).await.unwrap();

        let points = h.sink.points();
        assert_eq!(points.len(), 2);
        assert!(boolean(&points[0], "voted"));
        assert!(!boolean(&points[1], "voted"));
        old.assert_async().await;
        chat.assert_async().await;
    }

    #[tokio::test]
    async fn no_alert_outside_window() {
        let mut h = Harness::new().await;
        h.server.mock("GET", "/gov/proposals").with_body(PROPOSALS).create_async().await;
        h.server.mock("GET", Matcher::Regex(r"^/gov/proposals/\d+/votes$".into())).with_body("{}").create_async().await;
        let chat = h.server.mock("POST", CHAT_PATH).expect(0).create_async().await;

        h.run(CheckKind::Proposals, at(1, 0)).await.unwrap();

        assert_eq!(h.sink.points().len(), 2);
        chat.assert_async().await;
    }
}
