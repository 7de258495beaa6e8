pub mod bookmarks;
pub mod ids;
pub mod mutation;
pub mod permission;
pub mod pipeline;
pub mod refresh;
