//! Filter and sort of resource, announcement and bookmark collections.
//!
//! Filters apply in this order: category tab, type set (only under the `all`
//! tab), search term, importance flag. The result is then stably sorted on the
//! item's date, so items with equal dates keep their collection order.

use std::collections::BTreeMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};

use crate::models::announcement::Announcement;
use crate::models::bookmark::SavedResource;
use crate::models::listing::{Category, SortOrder, ViewCriteria};
use crate::models::resource::{Resource, ResourceType};

pub trait Viewable {
    type Tag: Eq + Hash;

    fn tag(&self) -> Option<&Self::Tag>;
    /// Text searched by the search box, absent optional fields are skipped.
    fn search_fields(&self) -> Vec<&str>;
    fn sort_date(&self) -> DateTime<Utc>;
    fn is_important(&self) -> bool {
        false
    }
}

impl Viewable for Resource {
    type Tag = ResourceType;

    fn tag(&self) -> Option<&ResourceType> {
        Some(&self.kind)
    }

    fn search_fields(&self) -> Vec<&str> {
        [
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            self.author.as_deref(),
            self.creator.as_deref(),
            self.contributor_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn sort_date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl Viewable for SavedResource {
    type Tag = ResourceType;

    fn tag(&self) -> Option<&ResourceType> {
        Some(&self.kind)
    }

    fn search_fields(&self) -> Vec<&str> {
        [
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            self.creator.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn sort_date(&self) -> DateTime<Utc> {
        self.saved_at
    }
}

/// Announcements are tabbed by course.
impl Viewable for Announcement {
    type Tag = String;

    fn tag(&self) -> Option<&String> {
        self.course_title.as_ref()
    }

    fn search_fields(&self) -> Vec<&str> {
        [
            Some(self.title.as_str()),
            Some(self.content.as_str()),
            self.author.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn sort_date(&self) -> DateTime<Utc> {
        self.date
    }

    fn is_important(&self) -> bool {
        self.important
    }
}

fn matches_category<T: Viewable>(item: &T, criteria: &ViewCriteria<T::Tag>) -> bool {
    match &criteria.active_category {
        Category::Only(tag) => item.tag() == Some(tag),
        Category::All if criteria.selected_types.is_empty() => true,
        Category::All => item
            .tag()
            .is_some_and(|tag| criteria.selected_types.contains(tag)),
    }
}

fn matches_search<T: Viewable>(item: &T, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    item.search_fields()
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Returns the items of `collection` selected by `criteria`, in display order.
pub fn view<'a, T: Viewable>(collection: &'a [T], criteria: &ViewCriteria<T::Tag>) -> Vec<&'a T> {
    let needle = criteria.search_needle();
    let mut items: Vec<&T> = collection
        .iter()
        .filter(|item| matches_category(*item, criteria))
        .filter(|item| matches_search(*item, needle.as_deref()))
        .filter(|item| !criteria.important_only || item.is_important())
        .collect();
    match criteria.sort_order {
        SortOrder::Newest => items.sort_by(|a, b| b.sort_date().cmp(&a.sort_date())),
        SortOrder::Oldest => items.sort_by_key(|item| item.sort_date()),
    }
    items
}

/// Items per tag over the whole collection, for the counters on category tabs.
pub fn category_counts<T>(collection: &[T]) -> BTreeMap<T::Tag, usize>
where
    T: Viewable,
    T::Tag: Ord + Clone,
{
    let mut counts = BTreeMap::new();
    for tag in collection.iter().filter_map(Viewable::tag) {
        *counts.entry(tag.clone()).or_insert(0) += 1;
    }
    counts
}
