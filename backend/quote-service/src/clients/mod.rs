pub mod account_client;

pub use account_client::{AccountClient, AccountReferences};
