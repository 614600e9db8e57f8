//! Tag grouping
//!
//! Tags only group posts; a group never owns the posts it lists.

use serde::Serialize;
use std::collections::BTreeMap;

use super::loader::PostEntry;

/// A tag with the sources of the posts that carry it
#[derive(Debug, Clone, Serialize)]
pub struct TagGroup {
    pub name: String,
    pub slug: String,
    pub posts: Vec<String>,
}

impl TagGroup {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug::slugify(name),
            posts: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.posts.len()
    }
}

/// Posts grouped by tag value, ordered by tag name
#[derive(Debug, Clone, Default, Serialize)]
pub struct TagIndex {
    groups: BTreeMap<String, TagGroup>,
}

impl TagIndex {
    /// Group `entries` by tag. Post sources within a group are sorted.
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a PostEntry>) -> Self {
        let mut groups: BTreeMap<String, TagGroup> = BTreeMap::new();
        for entry in entries {
            for tag in &entry.post.tags {
                groups
                    .entry(tag.clone())
                    .or_insert_with(|| TagGroup::new(tag))
                    .posts
                    .push(entry.source.clone());
            }
        }
        for group in groups.values_mut() {
            group.posts.sort();
        }
        Self { groups }
    }

    pub fn get(&self, tag: &str) -> Option<&TagGroup> {
        self.groups.get(tag)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups by name
    pub fn iter(&self) -> impl Iterator<Item = &TagGroup> {
        self.groups.values()
    }

    /// Groups with the most posts first, ties broken by name
    pub fn by_count(&self) -> Vec<&TagGroup> {
        let mut groups: Vec<_> = self.groups.values().collect();
        groups.sort_by(|a, b| b.count().cmp(&a.count()).then_with(|| a.name.cmp(&b.name)));
        groups
    }

    /// Tags whose slugs collide, e.g. `C++` and `c`
    pub fn slug_collisions(&self) -> Vec<(&str, Vec<&str>)> {
        let mut by_slug: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for group in self.groups.values() {
            by_slug
                .entry(group.slug.as_str())
                .or_default()
                .push(group.name.as_str());
        }
        by_slug.into_iter().filter(|(_, names)| names.len() > 1).collect()
    }
}
