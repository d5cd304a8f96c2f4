//! Built-in library tools: catalog search, availability, opening hours.

pub mod availability;
pub mod search;
pub mod timings;

pub use availability::CheckAvailabilityTool;
pub use search::SearchBookTool;
pub use timings::LibraryTimingsTool;
