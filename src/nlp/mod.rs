pub mod sentences;
pub mod summarize;
pub mod svd;

pub use sentences::EnglishTokenizer;
pub use summarize::Summarizer;
