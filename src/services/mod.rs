pub mod droid;
pub mod field_extractor;
pub mod investor_scraper;
pub mod page;
pub mod record_sink;

pub use droid::*;
pub use field_extractor::*;
pub use investor_scraper::*;
pub use page::*;
pub use record_sink::*;
