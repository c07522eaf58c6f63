//! Application services orchestrating repositories on behalf of the HTTP layer.

pub mod authors;
pub mod error;
pub mod feed;
pub mod follow;
pub mod groups;
pub mod pagination;
pub mod posts;
pub mod repos;
