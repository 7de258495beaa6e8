pub mod announcement;
pub mod bookmark;
pub mod course;
pub mod date;
pub mod listing;
pub mod resource;
pub mod user;
