//! Score submission to a leaderboard endpoint.
//!
//! The score is the level chosen for the next round. The endpoint may answer
//! with a percentile, which is shown to the player and otherwise unused.

use anyhow::{Context, Result};
use nback_core::RoundReport;
use serde::{Deserialize, Serialize};

pub const GAME_ID: &str = "n-back";

#[derive(Debug, Serialize)]
struct ScoreSubmission<'a> {
    game: &'static str,
    score: usize,
    report: &'a RoundReport,
}

#[derive(Debug, Deserialize)]
struct SubmissionReply {
    percentile: Option<f64>,
}

pub async fn submit_score(
    client: &reqwest::Client,
    url: &str,
    report: &RoundReport,
) -> Result<Option<f64>> {
    let body = ScoreSubmission {
        game: GAME_ID,
        score: report.score(),
        report,
    };

    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("failed to reach {url}"))?
        .error_for_status()
        .context("score endpoint rejected submission")?;

    let reply: SubmissionReply = response
        .json()
        .await
        .context("score endpoint returned malformed JSON")?;

    tracing::info!(score = report.score(), percentile = ?reply.percentile, "score submitted");
    Ok(reply.percentile)
}
