pub mod quote_client;

pub use quote_client::{QuoteBookmarks, QuoteClient};
