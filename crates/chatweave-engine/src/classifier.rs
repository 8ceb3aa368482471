//! Message-to-thread classification.
//!
//! A message joins the thread of the message it replies to, otherwise the backend scores
//! every active thread of the chat and the best candidate above the threshold wins. Anything
//! else starts a new thread. Backend trouble never fails classification; it degrades to a
//! new thread with a local fallback summary.

use std::sync::Arc;

use chatweave_llm::{generate_structured, GenerateRequest, StructuredError, TextGenerator};
use chatweave_persist::{MessageStore, ThreadStore};
use chatweave_types::{ClassifierConfig, MatchKind, Message, Thread, ThreadMatch};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::prompts::{self, purpose};
use crate::users::truncate_chars;

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    #[serde(default)]
    matches: Vec<CandidateScore>,
    #[serde(default)]
    new_thread_suggestion: Option<NewThreadSuggestion>,
}

#[derive(Debug, Deserialize)]
struct CandidateScore {
    thread_id: String,
    probability: f64,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct NewThreadSuggestion {
    theme: String,
    probability: f64,
}

#[derive(Debug, Deserialize)]
struct ThreadSummary {
    theme: String,
    summary: String,
}

pub struct ThreadClassifier {
    generator: Arc<dyn TextGenerator>,
    threads: Arc<dyn ThreadStore>,
    messages: Arc<dyn MessageStore>,
    config: ClassifierConfig,
}

impl ThreadClassifier {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        threads: Arc<dyn ThreadStore>,
        messages: Arc<dyn MessageStore>,
        config: ClassifierConfig,
    ) -> Self {
        Self {
            generator,
            threads,
            messages,
            config,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Assign the message to a thread, creating one when nothing fits.
    ///
    /// Only persistence failures are returned as errors.
    pub async fn classify_message(&self, message: &Message) -> Result<ThreadMatch> {
        if let Some(reply_to) = message.reply_to_message_id {
            if let Some(thread) = self
                .threads
                .get_by_message_id(message.chat_id, reply_to)
                .await?
                .filter(|t| t.is_active)
            {
                debug!(thread_id = %thread.id, reply_to, "Direct reply joins thread");
                let thread = self.add_message_to_thread(thread, message).await?;
                return Ok(ThreadMatch {
                    thread,
                    probability: 1.0,
                    reasoning: "direct reply".to_string(),
                    kind: MatchKind::DirectReply,
                });
            }
        }

        let active = self.threads.get_active_by_chat(message.chat_id).await?;
        if active.is_empty() {
            return self.create_thread(message).await;
        }

        match self.best_candidate(message, &active).await {
            Some((thread, probability, reasoning)) => {
                info!(
                    thread_id = %thread.id,
                    probability,
                    "Message matched existing thread"
                );
                let thread = self.add_message_to_thread(thread, message).await?;
                Ok(ThreadMatch {
                    thread,
                    probability,
                    reasoning,
                    kind: MatchKind::Classified,
                })
            }
            None => self.create_thread(message).await,
        }
    }

    /// Append the message and persist. Every `summary_interval`-th member triggers a theme
    /// and summary refresh from the latest `summary_window` members; a failed refresh keeps
    /// the previous ones.
    pub async fn add_message_to_thread(
        &self,
        mut thread: Thread,
        message: &Message,
    ) -> Result<Thread> {
        let appended = thread.append_message(message.id);
        let interval = self.config.summary_interval.max(1);

        if appended && thread.message_count() % interval == 0 {
            let recent = self
                .load_messages(&thread, self.config.summary_window)
                .await;
            if !recent.is_empty() {
                match self.summarize(&recent).await {
                    Ok(summary) => {
                        self.apply_summary(&mut thread, summary);
                        debug!(thread_id = %thread.id, "Regenerated thread summary");
                    }
                    Err(e) => {
                        warn!(thread_id = %thread.id, "Failed to regenerate summary: {}", e);
                    }
                }
            }
        }

        self.threads.update(&thread).await?;
        Ok(thread)
    }

    /// Start a thread whose only member is `message`
    pub async fn create_thread(&self, message: &Message) -> Result<ThreadMatch> {
        let (theme, summary) = match self.summarize(std::slice::from_ref(message)).await {
            Ok(s) => (self.theme_or_fallback(&s.theme), s.summary),
            Err(e) => {
                warn!(chat_id = message.chat_id, "Thread summary failed, using fallback: {}", e);
                (
                    self.config.fallback_theme.clone(),
                    truncate_chars(&message.text, self.config.fallback_summary_chars),
                )
            }
        };

        let thread = Thread::new(message.chat_id, theme, summary).with_first_message(message.id);
        self.threads.save(&thread).await?;
        info!(thread_id = %thread.id, theme = %thread.theme, "Created thread");

        Ok(ThreadMatch {
            thread,
            probability: 1.0,
            reasoning: "new thread".to_string(),
            kind: MatchKind::Created,
        })
    }

    /// Highest scoring active thread at or above the threshold. Ties go to the thread listed
    /// first. `None` when nothing qualifies or the backend failed.
    async fn best_candidate(
        &self,
        message: &Message,
        active: &[Thread],
    ) -> Option<(Thread, f64, String)> {
        let prompt =
            prompts::thread_classification_prompt(message, active, self.config.max_theme_chars);
        let request = GenerateRequest::new(purpose::THREAD_CLASSIFICATION, prompt)
            .with_schema(prompts::thread_classification_schema());

        let response: ClassificationResponse =
            match generate_structured(self.generator.as_ref(), request).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(chat_id = message.chat_id, "Thread classification failed: {}", e);
                    return None;
                }
            };

        if let Some(suggestion) = &response.new_thread_suggestion {
            debug!(
                theme = %suggestion.theme,
                probability = suggestion.probability,
                "Backend suggested a new thread"
            );
        }

        let mut best: Option<(&Thread, f64, &str)> = None;
        for thread in active {
            let Some(score) = response.matches.iter().find(|m| m.thread_id == thread.id) else {
                continue;
            };
            let probability = score.probability.clamp(0.0, 1.0);
            if probability.is_nan() || probability < self.config.min_probability {
                continue;
            }
            if best.map_or(true, |(_, p, _)| probability > p) {
                best = Some((thread, probability, score.reasoning.as_str()));
            }
        }

        best.map(|(thread, p, reasoning)| (thread.clone(), p, reasoning.to_string()))
    }

    async fn summarize(
        &self,
        messages: &[Message],
    ) -> std::result::Result<ThreadSummary, StructuredError> {
        let prompt = prompts::thread_summary_prompt(messages, self.config.max_theme_chars);
        let request = GenerateRequest::new(purpose::THREAD_SUMMARY, prompt)
            .with_schema(prompts::thread_summary_schema());
        generate_structured(self.generator.as_ref(), request).await
    }

    fn apply_summary(&self, thread: &mut Thread, summary: ThreadSummary) {
        if !summary.theme.trim().is_empty() {
            thread.theme = truncate_chars(summary.theme.trim(), self.config.max_theme_chars);
        }
        if !summary.summary.trim().is_empty() {
            thread.summary = summary.summary;
        }
    }

    fn theme_or_fallback(&self, theme: &str) -> String {
        let theme = theme.trim();
        if theme.is_empty() {
            self.config.fallback_theme.clone()
        } else {
            truncate_chars(theme, self.config.max_theme_chars)
        }
    }

    /// Latest `n` member messages, oldest first. Missing ones are skipped.
    pub(crate) async fn load_messages(&self, thread: &Thread, n: usize) -> Vec<Message> {
        let mut out = Vec::with_capacity(n);
        for id in thread.recent_message_ids(n) {
            match self.messages.get_by_id(thread.chat_id, *id).await {
                Ok(message) => out.push(message),
                Err(e) => debug!(thread_id = %thread.id, message_id = id, "Skipping member: {}", e),
            }
        }
        out
    }
}
