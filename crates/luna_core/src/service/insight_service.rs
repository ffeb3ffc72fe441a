//! Context assembly for the generative-text collaborator.
//!
//! # Responsibility
//! - Package profile, recent entries and chat history as opaque JSON context.
//! - Turn collaborator replies into typed results with fixed fallbacks.
//!
//! # Invariants
//! - Collaborator failures never surface as errors; callers get fallbacks.
//! - Only caller input problems (empty question) are reported as errors.

use crate::model::entry::CycleEntry;
use crate::model::profile::UserProfile;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Entries fetched for an analysis request.
pub const ANALYSIS_ENTRY_LIMIT: u32 = 50;
/// Entries forwarded with each chat turn.
pub const CHAT_ENTRY_LIMIT: usize = 20;

const ANALYSIS_INSTRUCTION: &str = "Review the cycle history in the context and reply with raw JSON only: \
{\"summary\": string, \"patterns\": [string], \"recommendations\": [string]}. \
Stay supportive and non-medical; say so when the data is too sparse.";
const CHAT_INSTRUCTION: &str = "Answer the user's question using the cycle data in the context. \
Be concise and supportive, never diagnose or prescribe, and remind the user to consult a \
healthcare professional when discussing symptoms.";
const CHAT_FALLBACK_REPLY: &str =
    "I'm having trouble answering right now. Please try again in a moment.";

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\n?").expect("valid code fence regex"));

/// Failure reported by a [`TextGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationError(pub String);

impl Display for GenerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "text generation failed: {}", self.0)
    }
}

impl Error for GenerationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightError {
    EmptyQuestion,
}

impl Display for InsightError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyQuestion => write!(f, "question must not be empty"),
        }
    }
}

impl Error for InsightError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "assistant")]
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// Everything the collaborator receives for one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub instruction: &'static str,
    pub context: Value,
    pub turns: Vec<ChatTurn>,
}

/// External generative-text service.
pub trait TextGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Structured analysis returned for the insights view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleAnalysis {
    pub summary: String,
    pub patterns: Vec<String>,
    pub recommendations: Vec<String>,
}

impl CycleAnalysis {
    pub fn fallback() -> Self {
        Self {
            summary: "Unable to generate an analysis right now. Please try again later."
                .to_string(),
            patterns: vec!["Not enough data to identify patterns yet.".to_string()],
            recommendations: vec![
                "Keep logging daily symptoms and moods for better insights.".to_string(),
            ],
        }
    }
}

pub struct InsightService<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> InsightService<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Requests a structured analysis of the user's recent entries.
    ///
    /// `entries` is expected newest first; only the first
    /// `ANALYSIS_ENTRY_LIMIT` are forwarded.
    pub fn analyze(&self, profile: Option<&UserProfile>, entries: &[CycleEntry]) -> CycleAnalysis {
        let request = GenerationRequest {
            instruction: ANALYSIS_INSTRUCTION,
            context: build_context(profile, entries, ANALYSIS_ENTRY_LIMIT as usize),
            turns: Vec::new(),
        };

        let reply = match self.generator.generate(&request) {
            Ok(reply) => reply,
            Err(err) => {
                warn!("event=insight_analyze module=service status=fallback reason=generator error={err}");
                return CycleAnalysis::fallback();
            }
        };

        match parse_analysis(&reply) {
            Some(analysis) => {
                info!(
                    "event=insight_analyze module=service status=ok patterns={} recommendations={}",
                    analysis.patterns.len(),
                    analysis.recommendations.len()
                );
                analysis
            }
            None => {
                warn!("event=insight_analyze module=service status=fallback reason=unparseable_reply");
                CycleAnalysis::fallback()
            }
        }
    }

    /// Answers one chat question with prior turns as history.
    pub fn chat(
        &self,
        question: &str,
        entries: &[CycleEntry],
        profile: Option<&UserProfile>,
        history: &[ChatTurn],
    ) -> Result<String, InsightError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(InsightError::EmptyQuestion);
        }

        let mut turns = history.to_vec();
        turns.push(ChatTurn {
            role: ChatRole::User,
            text: question.to_string(),
        });
        let request = GenerationRequest {
            instruction: CHAT_INSTRUCTION,
            context: build_context(profile, entries, CHAT_ENTRY_LIMIT),
            turns,
        };

        match self.generator.generate(&request) {
            Ok(reply) => {
                info!(
                    "event=insight_chat module=service status=ok history_turns={}",
                    history.len()
                );
                Ok(reply)
            }
            Err(err) => {
                warn!("event=insight_chat module=service status=fallback error={err}");
                Ok(CHAT_FALLBACK_REPLY.to_string())
            }
        }
    }
}

/// Builds the opaque JSON context handed to the collaborator.
pub fn build_context(profile: Option<&UserProfile>, entries: &[CycleEntry], limit: usize) -> Value {
    let forwarded = &entries[..entries.len().min(limit)];
    json!({
        "profile": {
            "full_name": profile.map_or("User", UserProfile::display_name),
            "email": profile.and_then(|profile| profile.email.as_deref()),
        },
        "entry_count": forwarded.len(),
        "cycle_entries": forwarded,
    })
}

/// Parses an analysis reply, tolerating markdown code fences around the JSON.
pub fn parse_analysis(reply: &str) -> Option<CycleAnalysis> {
    let cleaned = CODE_FENCE_RE.replace_all(reply, "");
    serde_json::from_str(cleaned.trim()).ok()
}
