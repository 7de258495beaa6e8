use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};

use crate::error::ValidationError;
use crate::server::constants::{ALL_CATEGORIES, MAX_SEARCH_TERM_LENGTH};

/// Raw query string of any listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub category: Option<String>,
    /// Comma separated, e.g. `book,video`.
    pub types: Option<String>,
    pub search: Option<String>,
    pub important: Option<bool>,
    pub sort: Option<String>,
}

#[derive(
    Clone, Debug, Copy, Default, PartialEq, Eq, StrumDisplay, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Category<T> {
    All,
    Only(T),
}

/// Combined filter and sort parameters applied to a collection before rendering.
#[derive(Clone, Debug)]
pub struct ViewCriteria<T> {
    pub active_category: Category<T>,
    /// Only consulted while `active_category` is `All`; empty means no filtering.
    pub selected_types: HashSet<T>,
    pub search_term: String,
    pub important_only: bool,
    pub sort_order: SortOrder,
}

impl<T> Default for ViewCriteria<T> {
    fn default() -> Self {
        Self {
            active_category: Category::All,
            selected_types: HashSet::new(),
            search_term: String::new(),
            important_only: false,
            sort_order: SortOrder::default(),
        }
    }
}

fn parse_value<T>(subject: &str, raw: &str) -> Result<T, ValidationError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = raw.trim();
    raw.parse().map_err(|e| ValidationError::InvalidInput {
        value: raw.to_string(),
        reason: format!("unknown {subject}: {e}"),
    })
}

pub fn validate_search_term(term: &str) -> Result<(), ValidationError> {
    let attempted = term.chars().count();
    if attempted > MAX_SEARCH_TERM_LENGTH {
        return Err(ValidationError::LimitExceeded {
            subject: "search term".to_string(),
            unit: "char".to_string(),
            attempted,
            limit: MAX_SEARCH_TERM_LENGTH,
        });
    }
    Ok(())
}

impl<T> ViewCriteria<T>
where
    T: FromStr + Eq + Hash,
    T::Err: Display,
{
    pub fn from_query(query: ViewQuery) -> Result<Self, ValidationError> {
        let active_category = match query.category.as_deref().map(str::trim) {
            None | Some("") => Category::All,
            Some(raw) if raw.eq_ignore_ascii_case(ALL_CATEGORIES) => Category::All,
            Some(raw) => Category::Only(parse_value("category", raw)?),
        };
        let selected_types = query
            .types
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_value("type", raw))
            .collect::<Result<HashSet<T>, _>>()?;
        let search_term = query.search.unwrap_or_default();
        validate_search_term(&search_term)?;
        let sort_order = match query.sort.as_deref() {
            None | Some("") => SortOrder::default(),
            Some(raw) => parse_value("sort order", raw)?,
        };
        Ok(Self {
            active_category,
            selected_types,
            search_term,
            important_only: query.important.unwrap_or(false),
            sort_order,
        })
    }
}

impl<T> ViewCriteria<T> {
    /// Lowercased search term, or `None` when it is blank.
    pub fn search_needle(&self) -> Option<String> {
        if self.search_term.trim().is_empty() {
            None
        } else {
            Some(self.search_term.to_lowercase())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resource::ResourceType;

    #[test]
    fn from_query_uses_defaults() {
        let criteria = ViewCriteria::<ResourceType>::from_query(ViewQuery::default()).unwrap();

        assert_eq!(criteria.active_category, Category::All);
        assert!(criteria.selected_types.is_empty());
        assert_eq!(criteria.search_needle(), None);
        assert!(!criteria.important_only);
        assert_eq!(criteria.sort_order, SortOrder::Newest);
    }

    #[test]
    fn from_query_parses_every_field() {
        let criteria = ViewCriteria::<ResourceType>::from_query(ViewQuery {
            category: Some("Video".to_string()),
            types: Some("book, dataset,,".to_string()),
            search: Some("Rust".to_string()),
            important: Some(true),
            sort: Some("oldest".to_string()),
        })
        .unwrap();

        assert_eq!(criteria.active_category, Category::Only(ResourceType::Video));
        assert_eq!(
            criteria.selected_types,
            HashSet::from([ResourceType::Book, ResourceType::Dataset])
        );
        assert_eq!(criteria.search_needle().as_deref(), Some("rust"));
        assert!(criteria.important_only);
        assert_eq!(criteria.sort_order, SortOrder::Oldest);
    }

    #[test]
    fn from_query_treats_all_as_no_category() {
        let criteria = ViewCriteria::<ResourceType>::from_query(ViewQuery {
            category: Some("ALL".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(criteria.active_category, Category::All);
    }

    #[test]
    fn from_query_rejects_unknown_type() {
        let err = ViewCriteria::<ResourceType>::from_query(ViewQuery {
            types: Some("book,podcast".to_string()),
            ..Default::default()
        })
        .expect_err("expected invalid input error");

        assert!(matches!(
            err,
            ValidationError::InvalidInput { value, .. } if value == "podcast"
        ));
    }

    #[test]
    fn from_query_rejects_unknown_sort() {
        let err = ViewCriteria::<ResourceType>::from_query(ViewQuery {
            sort: Some("random".to_string()),
            ..Default::default()
        })
        .expect_err("expected invalid input error");

        assert!(matches!(
            err,
            ValidationError::InvalidInput { value, .. } if value == "random"
        ));
    }

    #[test]
    fn from_query_rejects_oversized_search() {
        let err = ViewCriteria::<ResourceType>::from_query(ViewQuery {
            search: Some("a".repeat(MAX_SEARCH_TERM_LENGTH + 1)),
            ..Default::default()
        })
        .expect_err("expected limit error");

        assert!(matches!(err, ValidationError::LimitExceeded { .. }));
    }

    #[test]
    fn whitespace_search_is_no_search() {
        let criteria = ViewCriteria::<String> {
            search_term: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(criteria.search_needle(), None);
    }
}
