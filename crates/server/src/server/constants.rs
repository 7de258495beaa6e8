/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Upper bound for a search term, longer input is rejected before filtering.
pub const MAX_SEARCH_TERM_LENGTH: usize = 200;

/// Name of the persisted entry holding the saved resources.
pub const SAVED_RESOURCES_KEY: &str = "savedResources";
