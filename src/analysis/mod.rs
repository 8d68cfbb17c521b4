//! The two LLM-backed pipeline stages: propose a change from the crawled
//! corpus, then judge whether a follow-up commit addresses it.

use thiserror::Error;
use tracing::{debug, info_span, Instrument};

use crate::github::CommitChangeSet;
use crate::llm::{ChatCompleter, LlmError};
use crate::session::AnalysisSession;

/// Literal marker the proposal reply is split on. Best-effort textual
/// contract with the model, not a structured format.
const SUGGESTION_MARKER: &str = "Suggested Change:";

/// Suggestion recorded when the model's reply carries no marker.
const NO_SUGGESTION_FALLBACK: &str = "No specific change suggested.";

const PROPOSAL_SYSTEM_PROMPT: &str = "You are an expert code analysis assistant. Analyze these \
    repository files and suggest one change to assess the student's understanding of the topic. \
    Introduce the change with the line 'Suggested Change:'.";

const VERIFICATION_SYSTEM_PROMPT: &str = "You are a code review assistant. Verify if the changes \
    made in the commit address the suggested improvement.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Verification was requested before any proposal produced a
    /// suggestion. The CLI flow makes this unreachable; hitting it means a
    /// caller skipped the proposal stage.
    #[error("No suggested change recorded for this session")]
    NoSuggestion,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Failed to serialize prompt payload: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// Outcome of the proposal stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub summary: String,
    pub suggested_change: String,
}

/// Free-text outcome of the verification stage; no pass/fail parsing is
/// performed.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub result: String,
}

/// Ask the model to summarize the corpus and propose exactly one change.
/// On success the suggestion is written into the session so a later
/// verification can refer to it.
pub async fn propose(
    session: &mut AnalysisSession,
    llm: &dyn ChatCompleter,
) -> Result<Proposal, AnalysisError> {
    let corpus = serde_json::to_string_pretty(&session.files)?;
    let user_prompt = format!(
        "Analyze this GitHub repository and suggest one meaningful change or improvement. \
         Repository: {}\n\nFiles:\n{}",
        session.repo, corpus
    );

    let reply = llm
        .complete(PROPOSAL_SYSTEM_PROMPT, &user_prompt)
        .instrument(info_span!("propose", repo = %session.repo))
        .await?;
    let proposal = split_reply(&reply);
    debug!(
        summary_bytes = proposal.summary.len(),
        suggestion_bytes = proposal.suggested_change.len(),
        "parsed proposal reply"
    );

    session.record_suggestion(proposal.suggested_change.clone());
    Ok(proposal)
}

/// Ask the model whether the commit's changes address the stored
/// suggestion. Requires a prior successful proposal.
pub async fn verify(
    session: &AnalysisSession,
    changes: &CommitChangeSet,
    llm: &dyn ChatCompleter,
) -> Result<Verdict, AnalysisError> {
    let suggested_change = session
        .suggested_change
        .as_deref()
        .ok_or(AnalysisError::NoSuggestion)?;

    let serialized = serde_json::to_string_pretty(changes)?;
    let user_prompt = format!(
        "Verify if these commit changes address the suggested improvement for repository \
         {}.\n\nSuggested Change: {}\n\nCommit Changes:\n{}",
        session.repo, suggested_change, serialized
    );

    let result = llm
        .complete(VERIFICATION_SYSTEM_PROMPT, &user_prompt)
        .instrument(info_span!("verify", repo = %session.repo, hash = %changes.hash))
        .await?;

    Ok(Verdict { result })
}

/// Split the reply on the first occurrence of the marker: text before is
/// the summary, text after is the suggestion, both trimmed. No marker
/// means the whole reply is the summary and the suggestion falls back to a
/// fixed sentinel.
fn split_reply(reply: &str) -> Proposal {
    match reply.split_once(SUGGESTION_MARKER) {
        Some((summary, suggestion)) => Proposal {
            summary: summary.trim().to_string(),
            suggested_change: suggestion.trim().to_string(),
        },
        None => Proposal {
            summary: reply.trim().to_string(),
            suggested_change: NO_SUGGESTION_FALLBACK.to_string(),
        },
    }
}
