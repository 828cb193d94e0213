//! Microsoft-account OAuth client for the OneNote LMS integration.
//!
//! This crate owns the credential side of the integration: the application's
//! OAuth client credentials, per-user refresh/access token records, and the
//! refresh-token grant against the provider's token endpoint.
//!
//! The session model is deliberately small. A [`MsAccountClient`] is either
//! logged in (a non-expired access token is stored for its user) or logged
//! out. [`MsAccountClient::refresh`] moves it to the logged-in state and
//! reports success as a boolean; token expiry or a failed refresh moves it
//! back. Callers poll [`MsAccountClient::is_logged_in`] and retry the refresh
//! themselves, so no failure here ever surfaces as an error value.
//!
//! ```ignore
//! let config = MsAccountConfig::load_resolved()?.expect("credentials file");
//! let mut account = MsAccountClient::new(config, Box::new(MemoryTokenStore::new()), "user-1");
//! account.store_refresh_token(refresh_token);
//! if account.refresh().await {
//!     assert!(account.is_logged_in());
//! }
//! ```

mod account;
mod config;
mod store;

pub use account::MsAccountClient;
pub use config::{ConfigError, MsAccountConfig};
pub use store::{MemoryTokenStore, TokenRecord, TokenStore, token_is_live};
