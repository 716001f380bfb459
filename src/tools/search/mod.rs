pub mod serpapi;
mod service;

pub use serpapi::SerpApiProvider;
pub use service::SearchProvider;
