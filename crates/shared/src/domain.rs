use serde::{Deserialize, Serialize};

/// An item of a remote collection that can be told apart from its siblings.
///
/// Ids are only required to be unique within one fetched page.
pub trait CollectionRecord: Clone + Send + Sync + 'static {
    fn record_id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub search_path: String,
    /// Number of inventory items the search currently matches.
    #[serde(default)]
    pub count: u64,
}

impl CollectionRecord for SavedSearch {
    fn record_id(&self) -> &str {
        &self.id
    }
}
