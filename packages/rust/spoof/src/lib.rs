//! Content transformers that invert an article's conclusion.
//!
//! [`Spoofer`] is the capability interface the pipeline consumes. The
//! [`MockSpoofer`] is deterministic and offline; [`OpenAiSpoofer`] asks a
//! chat-completions endpoint to rewrite the article. Transformers receive
//! the original paragraphs and the original rating and return new
//! paragraphs arguing the opposite conclusion; rating inversion itself
//! happens in the domain model, not here.

mod openai;

use async_trait::async_trait;

use counterclaim_shared::{CounterclaimError, Rating, Result, SpooferConfig, SpooferKind};

pub use openai::OpenAiSpoofer;

/// Capability interface for the content transformer.
#[async_trait]
pub trait Spoofer: Send + Sync {
    /// Produce counter-article paragraphs from the original paragraphs
    /// and the original rating.
    async fn spoof(&self, content: &[String], rating: Rating) -> Result<Vec<String>>;
}

impl std::fmt::Debug for dyn Spoofer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Spoofer")
    }
}

/// Deterministic offline transformer: negates each paragraph by
/// prepending "NOT ". Infallible, for development and tests.
pub struct MockSpoofer;

#[async_trait]
impl Spoofer for MockSpoofer {
    async fn spoof(&self, content: &[String], _rating: Rating) -> Result<Vec<String>> {
        Ok(content.iter().map(|p| format!("NOT {p}")).collect())
    }
}

/// Build the configured transformer backend.
///
/// For the OpenAI backend the API key is read from the configured env
/// var; a missing key is a config error.
pub fn spoofer_from_config(config: &SpooferConfig) -> Result<Box<dyn Spoofer>> {
    match config.kind {
        SpooferKind::Mock => Ok(Box::new(MockSpoofer)),
        SpooferKind::Openai => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                CounterclaimError::config(format!("{} is not set", config.api_key_env))
            })?;
            Ok(Box::new(OpenAiSpoofer::new(
                api_key,
                config.model.clone(),
                config.base_url.clone(),
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_negates_every_paragraph() {
        let content = vec!["The claim is false.".to_string(), "Experts agree.".to_string()];
        let spoofed = MockSpoofer.spoof(&content, Rating::False).await.unwrap();
        assert_eq!(spoofed, vec!["NOT The claim is false.", "NOT Experts agree."]);
    }

    #[tokio::test]
    async fn mock_handles_empty_content() {
        let spoofed = MockSpoofer.spoof(&[], Rating::True).await.unwrap();
        assert!(spoofed.is_empty());
    }

    #[test]
    fn config_selects_mock_backend() {
        let config = SpooferConfig::default();
        assert!(spoofer_from_config(&config).is_ok());
    }

    #[test]
    fn openai_backend_requires_key() {
        let config = SpooferConfig {
            kind: SpooferKind::Openai,
            api_key_env: "CC_SPOOF_TEST_UNSET_KEY_13579".into(),
            ..SpooferConfig::default()
        };
        let err = spoofer_from_config(&config).unwrap_err();
        assert!(matches!(err, CounterclaimError::Config { .. }));
    }
}
