pub mod core;
pub mod nlp;
pub mod scraping;
pub mod tools;
pub mod web;

pub use crate::core::types::*;
pub use crate::core::AppState;
pub use tools::{digest, search};
