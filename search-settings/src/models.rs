//! Small lookup helpers that the settings service consults but that don't
//! belong on `search_store::models::AppSettings` itself.

/// Whether a provider is reached over localhost/LAN (needs an explicit
/// `base_url`) or is a cloud API (endpoint is implicit in the provider
/// name). Drives the base-URL reset rule in §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Local,
    Cloud,
}

/// Known embedding model output dimensions, consulted by
/// `SettingsService::set_embedding_provider` so `vector_index.dimensions`
/// tracks the configured model automatically. An unrecognised model
/// leaves the previously configured dimensions untouched.
pub fn known_embedding_dimensions(model: &str) -> Option<u32> {
    match model {
        "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        "text-embedding-ada-002" => Some(1536),
        "nomic-embed-text" => Some(768),
        "mxbai-embed-large" => Some(1024),
        "all-minilm-l6-v2" => Some(384),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_resolves_its_dimensions() {
        assert_eq!(known_embedding_dimensions("nomic-embed-text"), Some(768));
    }

    #[test]
    fn unknown_model_resolves_to_none() {
        assert_eq!(known_embedding_dimensions("some-future-model"), None);
    }
}
