pub mod catalog;
pub mod contest_type;
pub mod feed;
