pub mod catalog;
pub mod config;
pub mod content;
pub mod logger;
pub mod paginator;
pub mod post_list;
pub mod query;
pub mod query_string;
pub mod search;
pub mod server;
pub mod stats;
pub mod text_utils;
mod test_data;
mod view;
