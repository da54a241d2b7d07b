pub mod auth;
pub mod posts;
pub mod series;
pub mod upload;
