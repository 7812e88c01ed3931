use serde::{Deserialize, Serialize, ser::SerializeMap};
use serde_json::Value;

/// How hard the provider should search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    pub search_depth: SearchDepth,
    pub max_results: u32,
}

/// The two lookups the hub offers for a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseCase {
    Weather,
    News,
}

impl UseCase {
    pub const fn all() -> &'static [UseCase] {
        &[UseCase::Weather, UseCase::News]
    }

    pub fn build_query(&self, city: &str) -> String {
        match self {
            UseCase::Weather => {
                format!("current weather in {city} temperature humidity conditions")
            }
            UseCase::News => format!(
                "Top 5 latest news articles about {city}, including major events, politics, economy, and local updates."
            ),
        }
    }

    pub fn parameters(&self) -> SearchParameters {
        match self {
            UseCase::Weather => SearchParameters { search_depth: SearchDepth::Basic, max_results: 5 },
            UseCase::News => SearchParameters { search_depth: SearchDepth::Advanced, max_results: 5 },
        }
    }

    /// Name of the item list in the rendered record.
    pub fn items_field(&self) -> &'static str {
        match self {
            UseCase::Weather => "results",
            UseCase::News => "articles",
        }
    }

    /// Tab label used by the presentation layer.
    pub fn label(&self) -> &'static str {
        match self {
            UseCase::Weather => "Weather",
            UseCase::News => "News",
        }
    }
}

impl std::fmt::Display for UseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One result entry as the provider handed it over; every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// What came back over the provider boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    Structured { results: Vec<RawItem>, answer: Option<String> },
    /// The provider answered with something that is not a key/value document.
    Opaque(Value),
}

/// Successful outcome of an invocation, before use-case shaping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPayload {
    pub results: Vec<RawItem>,
    pub answer: Option<String>,
    pub raw_response: Option<Value>,
}

impl From<ProviderReply> for SearchPayload {
    fn from(reply: ProviderReply) -> Self {
        match reply {
            ProviderReply::Structured { results, answer } => {
                SearchPayload { results, answer, raw_response: None }
            }
            ProviderReply::Opaque(value) => {
                SearchPayload { results: Vec::new(), answer: None, raw_response: Some(value) }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub content: String,
    pub url: String,
}

impl From<&RawItem> for SearchItem {
    fn from(raw: &RawItem) -> Self {
        SearchItem {
            title: raw.title.clone().unwrap_or_default(),
            content: raw.content.clone().unwrap_or_default(),
            url: raw.url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordBody {
    Found { items: Vec<SearchItem>, summary: Option<String>, raw_response: Option<Value> },
    Failed { error: String },
}

/// Output handed to the presentation layer, regardless of how the search went.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub city: String,
    pub search_query: String,
    pub use_case: UseCase,
    pub body: RecordBody,
}

impl NormalizedRecord {
    pub fn items(&self) -> Option<&[SearchItem]> {
        match &self.body {
            RecordBody::Found { items, .. } => Some(items),
            RecordBody::Failed { .. } => None,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Found { summary, .. } => summary.as_deref(),
            RecordBody::Failed { .. } => None,
        }
    }

    pub fn raw_response(&self) -> Option<&Value> {
        match &self.body {
            RecordBody::Found { raw_response, .. } => raw_response.as_ref(),
            RecordBody::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Failed { error } => Some(error),
            RecordBody::Found { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, RecordBody::Failed { .. })
    }
}

// Field order mirrors the rendered JSON: city, query, then the body.
impl Serialize for NormalizedRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("city", &self.city)?;
        map.serialize_entry("search_query", &self.search_query)?;

        match &self.body {
            RecordBody::Found { items, summary, raw_response } => {
                map.serialize_entry(self.use_case.items_field(), items)?;
                if let Some(summary) = summary {
                    map.serialize_entry("summary", summary)?;
                }
                if let Some(raw) = raw_response {
                    map.serialize_entry("raw_response", raw)?;
                }
            }
            RecordBody::Failed { error } => {
                map.serialize_entry("error", error)?;
            }
        }

        map.end()
    }
}
