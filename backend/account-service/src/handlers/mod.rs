pub mod accounts;
pub mod bookmarks;
pub mod health;
pub mod usage;
