//! Google Sheets access for sheetctl.
//!
//! - [`credentials`] loads the OAuth client descriptor
//! - [`tokens`] loads and persists the token record
//! - [`oauth`] turns those into an [`AuthorizedHandle`], or runs the
//!   two-step authorization when there is no token yet
//! - [`sheets`] issues the create / write / read requests
//!
//! # Example
//!
//! ```ignore
//! use sheetctl_google::{load_client_descriptor, load_token_record, Authorizer, SheetsClient, SheetsConfig};
//!
//! let config = SheetsConfig::new();
//! let descriptor = load_client_descriptor(&config.credentials_path)?;
//! let authorizer = Authorizer::new(descriptor, &config)?;
//!
//! let record = match load_token_record(&config.token_path)? {
//!     Some(record) => record,
//!     None => {
//!         let request = authorizer.auth_url();
//!         println!("visit {}", request.url);
//!         authorizer.exchange_code(&request, &read_code()).await?
//!     }
//! };
//!
//! let client = SheetsClient::new(authorizer.with_stored_token(record)?, &config);
//! let id = client.create_spreadsheet("Budget").await?;
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod oauth;
pub mod sheets;
pub mod tokens;

pub use config::SheetsConfig;
pub use credentials::{ClientDescriptor, load_client_descriptor};
pub use error::{SheetsError, SheetsErrorCode, SheetsResult};
pub use oauth::{AuthorizationRequest, AuthorizedHandle, Authorizer};
pub use sheets::{SheetsClient, UpdateSummary, ValueInputOption};
pub use tokens::{TokenRecord, clear_token_record, load_token_record, save_token_record};
