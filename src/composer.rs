//! Request composer - field mutators for a [`RequestDraft`]
//!
//! Header edits always build a fresh map and swap it in, so a rename never
//! exposes a state holding both the old and the new key.

use std::collections::BTreeMap;

use crate::models::{resource_path, HttpMethod, RequestDraft, ResourceType};

impl RequestDraft {
    /// Change the method. The URL is left alone.
    pub fn set_method(&mut self, method: HttpMethod) {
        self.method = method;
    }

    /// Pick a resource type from the catalog and re-derive the URL.
    ///
    /// An empty name is the "nothing selected" choice: the type is unset and
    /// the URL kept.
    pub fn set_resource_type(&mut self, name: &str) {
        if name.is_empty() {
            self.resource_type = ResourceType::Unset;
            return;
        }
        self.resource_type = ResourceType::Selected(name.to_string());
        self.url = resource_path(name);
    }

    /// Type a resource name by hand and re-derive the URL
    pub fn set_custom_resource_type(&mut self, text: &str) {
        self.resource_type = ResourceType::Custom(text.to_string());
        if !text.is_empty() {
            self.url = resource_path(text);
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn set_query_params(&mut self, params: impl Into<String>) {
        self.query_params = params.into();
    }

    /// Add a header with an empty value; an existing key is reset
    pub fn add_header(&mut self, key: &str) {
        if key.is_empty() {
            return;
        }
        let mut headers = self.headers.clone();
        headers.insert(key.to_string(), String::new());
        self.replace_headers(headers);
    }

    pub fn set_header_value(&mut self, key: &str, value: impl Into<String>) {
        let mut headers = self.headers.clone();
        headers.insert(key.to_string(), value.into());
        self.replace_headers(headers);
    }

    /// Move a header's value to a new key. A header already named `new_key`
    /// is replaced.
    pub fn rename_header(&mut self, old_key: &str, new_key: &str) {
        if old_key == new_key {
            return;
        }
        let Some(value) = self.headers.get(old_key).cloned() else {
            return;
        };
        let headers: BTreeMap<String, String> = self
            .headers
            .iter()
            .filter(|(key, _)| key.as_str() != old_key && key.as_str() != new_key)
            .map(|(key, value)| (key.clone(), value.clone()))
            .chain(std::iter::once((new_key.to_string(), value)))
            .collect();
        self.replace_headers(headers);
    }

    pub fn remove_header(&mut self, key: &str) {
        if !self.headers.contains_key(key) {
            return;
        }
        let mut headers = self.headers.clone();
        headers.remove(key);
        self.replace_headers(headers);
    }

    /// Swap in a whole new header map
    pub fn replace_headers(&mut self, headers: BTreeMap<String, String>) {
        self.headers = headers;
    }

    /// Replace every field with a stored snapshot
    pub fn restore(&mut self, snapshot: &RequestDraft) {
        *self = snapshot.clone();
    }
}
