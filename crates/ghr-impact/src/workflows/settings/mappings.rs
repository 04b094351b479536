use serde::{Deserialize, Serialize};

/// Delimiter used when keyword lists are flattened into a single stored column.
pub const KEYWORD_SEPARATOR: &str = ", ";

/// Keyword list routed to one reporting system, in caller order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMapping {
    pub keywords: Vec<String>,
    pub system_name: String,
}

/// A persisted mapping as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMapping {
    pub id: i64,
    pub keywords: Vec<String>,
    pub system_name: String,
    pub sort_order: i64,
}

/// Flattens keywords for storage.
pub fn join_keywords(keywords: &[String]) -> String {
    keywords.join(KEYWORD_SEPARATOR)
}

/// Inverse of [`join_keywords`]: split on commas, trim, drop empty tokens.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Body accepted by the replace operation. A missing or null list clears the mappings.
#[derive(Debug, Default, Deserialize)]
pub struct ReplaceMappingsRequest {
    #[serde(default)]
    pub mappings: Option<Vec<MappingInput>>,
}

#[derive(Debug, Deserialize)]
pub struct MappingInput {
    #[serde(default)]
    pub keywords: Option<KeywordsInput>,
    #[serde(default)]
    pub system_name: Option<String>,
    /// Older dashboards posted `system` instead of `system_name`.
    #[serde(default)]
    pub system: Option<String>,
}

/// Keywords arrive either as a list or as an already-joined string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum KeywordsInput {
    List(Vec<String>),
    Text(String),
}

impl KeywordsInput {
    fn normalize(self) -> Vec<String> {
        match self {
            KeywordsInput::List(items) => items
                .iter()
                .flat_map(|item| split_keywords(item))
                .collect(),
            KeywordsInput::Text(raw) => split_keywords(&raw),
        }
    }
}

/// Validation failure for a replace request; nothing is written when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMapping {
    #[error("mapping {index} is missing system_name")]
    MissingSystemName { index: usize },
}

impl ReplaceMappingsRequest {
    /// Validates every entry up front so a bad entry rejects the whole request.
    pub fn into_mappings(self) -> Result<Vec<SystemMapping>, InvalidMapping> {
        self.mappings
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                let system_name = input
                    .system_name
                    .or(input.system)
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .ok_or(InvalidMapping::MissingSystemName { index })?;
                let keywords = input.keywords.map(KeywordsInput::normalize).unwrap_or_default();
                Ok(SystemMapping {
                    keywords,
                    system_name,
                })
            })
            .collect()
    }
}
