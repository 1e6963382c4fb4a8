use fetchd_api::{FetchdClient, WordKind};

use crate::resolver;

const FALLBACK_ADJECTIVES: [&str; 8] = [
    "amazing",
    "epic",
    "awesome",
    "fantastic",
    "incredible",
    "brilliant",
    "stunning",
    "magnificent"
];

const FALLBACK_NOUNS: [&str; 8] = [
    "video", "clip", "movie", "film", "content", "media", "footage", "recording"
];

/// Word lists for random filename generation, fetched from the engine
/// once at startup.
#[derive(Debug, Clone)]
pub struct WordBank {
    adjectives: Vec<String>,
    nouns: Vec<String>
}

impl WordBank {
    /// Loads both lists from the engine, substituting the built-in list
    /// for any that fails or comes back empty.
    pub async fn load(client: &FetchdClient) -> Self {
        Self {
            adjectives: fetch_or_fallback(client, WordKind::Adjectives, &FALLBACK_ADJECTIVES).await,
            nouns: fetch_or_fallback(client, WordKind::Nouns, &FALLBACK_NOUNS).await
        }
    }

    pub fn fallback() -> Self {
        Self {
            adjectives: FALLBACK_ADJECTIVES.iter().map(ToString::to_string).collect(),
            nouns: FALLBACK_NOUNS.iter().map(ToString::to_string).collect()
        }
    }

    pub fn random_filename(&self) -> String {
        resolver::random_filename(&self.adjectives, &self.nouns)
    }
}

async fn fetch_or_fallback(
    client: &FetchdClient,
    kind: WordKind,
    fallback: &[&str]
) -> Vec<String> {
    match client.word_list(kind).await {
        Ok(words) if !words.is_empty() => words,
        Ok(_) => {
            tracing::warn!("engine returned an empty {} list, using built-in", kind.as_str());
            fallback.iter().map(ToString::to_string).collect()
        }
        Err(err) => {
            tracing::warn!("failed to fetch {} list: {err}, using built-in", kind.as_str());
            fallback.iter().map(ToString::to_string).collect()
        }
    }
}
