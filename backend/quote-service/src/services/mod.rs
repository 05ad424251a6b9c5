pub mod bookmarks;
pub mod quotes;

pub use bookmarks::BookmarkCounterGuard;
pub use quotes::QuoteService;
