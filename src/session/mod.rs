//! Client-side session state: the single source of truth for "who is logged
//! in" in a Rust client shell. Restores identity from redirect-carried
//! credentials or a stored token, and exposes login/register/logout.

pub mod api;
pub mod context;
pub mod store;

pub use api::{AuthApi, HttpAuthApi, SessionError};
pub use context::{strip_auth_params, Restoration, SessionContext, TOKEN_KEY, USER_KEY};
pub use store::{CredentialStore, MemoryStore};
