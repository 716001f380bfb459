pub mod clean;
pub mod page;
pub mod politeness;

pub use clean::TextCleaner;
pub use page::{extract_visible_text, HttpPageScraper, PageSource};
pub use politeness::ScrapeLimiter;
