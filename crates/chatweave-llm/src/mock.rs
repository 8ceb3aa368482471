// Scripted text generator for tests and offline runs

use crate::traits::{GenerateRequest, TextGenerator};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Failure(String),
}

/// Answers each request with canned replies keyed by `GenerateRequest::purpose`.
///
/// Replies for a purpose are consumed in order; the last one repeats. Every request is
/// recorded so tests can assert which backend calls happened.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, purpose: impl Into<String>, text: impl Into<String>) -> Self {
        self.push(purpose.into(), Scripted::Text(text.into()));
        self
    }

    pub fn respond_json(self, purpose: impl Into<String>, value: serde_json::Value) -> Self {
        self.respond(purpose, value.to_string())
    }

    pub fn fail(self, purpose: impl Into<String>, message: impl Into<String>) -> Self {
        self.push(purpose.into(), Scripted::Failure(message.into()));
        self
    }

    /// Replace whatever is scripted for `purpose` with a single reply
    pub fn set_response(&self, purpose: &str, text: impl Into<String>) {
        let mut replies = lock(&self.replies);
        let queue = replies.entry(purpose.to_string()).or_default();
        queue.clear();
        queue.push_back(Scripted::Text(text.into()));
    }

    /// All requests seen so far, in call order
    pub fn calls(&self) -> Vec<GenerateRequest> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, purpose: &str) -> usize {
        lock(&self.calls).iter().filter(|r| r.purpose == purpose).count()
    }

    fn push(&self, purpose: String, reply: Scripted) {
        lock(&self.replies).entry(purpose).or_default().push_back(reply);
    }

    fn next_reply(&self, purpose: &str) -> Option<Scripted> {
        let mut replies = lock(&self.replies);
        let queue = replies.get_mut(purpose)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_content(&self, request: GenerateRequest) -> Result<String> {
        let purpose = request.purpose.clone();
        lock(&self.calls).push(request);

        match self.next_reply(&purpose) {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Failure(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("No scripted reply for {}", purpose)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_consumed_in_order_and_last_repeats() {
        let generator = ScriptedGenerator::new()
            .respond("summary", "first")
            .respond("summary", "second");

        let req = || GenerateRequest::new("summary", "prompt");
        assert_eq!(generator.generate_content(req()).await.unwrap(), "first");
        assert_eq!(generator.generate_content(req()).await.unwrap(), "second");
        assert_eq!(generator.generate_content(req()).await.unwrap(), "second");
        assert_eq!(generator.call_count("summary"), 3);

        generator.set_response("summary", "third");
        assert_eq!(generator.generate_content(req()).await.unwrap(), "third");
    }

    #[tokio::test]
    async fn test_unscripted_purpose_fails() {
        let generator = ScriptedGenerator::new();
        let result = generator
            .generate_content(GenerateRequest::new("unknown", "prompt"))
            .await;
        assert!(result.is_err());
        assert_eq!(generator.calls().len(), 1);
    }
}
