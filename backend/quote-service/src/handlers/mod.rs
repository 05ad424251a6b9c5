pub mod bookmarks;
pub mod health;
pub mod quotes;
