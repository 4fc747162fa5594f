//! Authentication: identity, session persistence, validation and login.
//!
//! This module provides:
//! - `Identity`: username and password, never persisted
//! - `SessionStore`: the cookie header on disk as `{ "cookieHeader": ... }`
//! - `SessionValidator`: asks the site whether a stored cookie still works
//! - `LoginFlow`: nonce fetch, form POST, cookie derivation
//! - `SessionManager`: reuse-or-login for one run
//!
//! Sessions have no local expiry; the site is the only judge of validity.

pub mod credentials;
pub mod error;
pub mod login;
pub mod manager;
pub mod session;
pub mod validator;

pub use credentials::Identity;
pub use error::AuthError;
pub use login::{derive_credential, LoginFlow, LoginNonce};
pub use manager::{SessionManager, SessionOrigin};
pub use session::{SessionCredential, SessionStore};
pub use validator::SessionValidator;
