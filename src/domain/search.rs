// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/search.rs
//
// Chooser search filter state and the request parameters derived from it.

/// Filter state of a chooser's search box, collection select and tag cloud.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub collection_id: Option<String>,
    /// Tag filter; kept so pagination stays within the tag.
    pub tag: Option<String>,
    pub page: Option<u32>,
}

impl SearchQuery {
    /// Free text search. Searching drops the tag filter, otherwise a tag
    /// could never be deselected.
    pub fn search(&mut self) -> Vec<(String, String)> {
        self.tag = None;
        self.page = None;
        let mut params = vec![("q".to_string(), self.text.clone())];
        self.push_collection(&mut params);
        params
    }

    /// Jump to `page`, keeping the query, tag and collection filters.
    pub fn set_page(&mut self, page: u32) -> Vec<(String, String)> {
        self.page = Some(page);
        let mut params = Vec::new();
        if !self.text.is_empty() {
            params.push(("q".to_string(), self.text.clone()));
        }
        self.push_collection(&mut params);
        if let Some(tag) = &self.tag {
            params.push(("tag".to_string(), tag.clone()));
        }
        params.push(("p".to_string(), page.to_string()));
        params
    }

    /// Filter by a suggested tag; the text box is emptied.
    pub fn choose_tag(&mut self, tag: &str) -> Vec<(String, String)> {
        self.tag = Some(tag.to_string());
        self.text.clear();
        self.page = None;
        let mut params = vec![("tag".to_string(), tag.to_string())];
        self.push_collection(&mut params);
        params
    }

    pub fn set_collection(&mut self, collection_id: Option<String>) {
        self.collection_id = collection_id.filter(|id| !id.is_empty());
    }

    fn push_collection(&self, params: &mut Vec<(String, String)>) {
        if let Some(id) = self.collection_id.as_ref().filter(|id| !id.is_empty()) {
            params.push(("collection_id".to_string(), id.clone()));
        }
    }
}
