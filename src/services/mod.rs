// Service exports
pub mod cache;
pub mod extractor;
pub mod roster;

pub use cache::{CacheKey, CacheStats, TokenCache};
pub use extractor::{Extraction, ExtractorError, TokenExtractor, TokenSource};
pub use roster::{Roster, RosterError};
