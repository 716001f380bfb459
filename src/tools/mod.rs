pub mod digest;
pub mod search;

pub use digest::DigestService;
