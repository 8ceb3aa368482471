use crate::traits::{GenerateRequest, TextGenerator};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuredError {
    #[error("Backend call failed: {0}")]
    Backend(#[source] anyhow::Error),

    #[error("Malformed response for {purpose}: {source}")]
    Malformed {
        purpose: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Request {0} has no response schema")]
    MissingSchema(String),
}

/// Run a schema-constrained generation and parse the JSON document into `T`.
///
/// Backend errors and malformed JSON are reported separately so call sites can degrade to
/// their own fallback.
pub async fn generate_structured<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    request: GenerateRequest,
) -> Result<T, StructuredError> {
    if request.schema.is_none() {
        return Err(StructuredError::MissingSchema(request.purpose));
    }
    let purpose = request.purpose.clone();

    let text = generator
        .generate_content(request)
        .await
        .map_err(StructuredError::Backend)?;

    parse_json(&text).map_err(|source| StructuredError::Malformed { purpose, source })
}

/// Parse a JSON document, tolerating a surrounding Markdown code fence
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fence(text))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Verdict {
        ok: bool,
    }

    #[test]
    fn test_parse_plain_json() {
        let v: Verdict = parse_json(r#"{"ok": true}"#).unwrap();
        assert_eq!(v, Verdict { ok: true });
    }

    #[test]
    fn test_parse_fenced_json() {
        let v: Verdict = parse_json("```json\n{\"ok\": false}\n```").unwrap();
        assert_eq!(v, Verdict { ok: false });
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_json::<Verdict>("sure, here you go").is_err());
    }
}
