pub mod accounts;
pub mod bookmarks;
pub mod usage;

pub use accounts::AccountService;
pub use bookmarks::BookmarkService;
pub use usage::UsageCounterEngine;
