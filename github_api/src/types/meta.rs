use serde::{Deserialize, Serialize};

use crate::pagination::Page;

/// Envelope returned by the search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults<T> {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<T>,
}

impl<T> Page for SearchResults<T> {
    type Item = T;

    fn into_items(self) -> Vec<T> {
        self.items
    }
}
