//! Auth-domain values: interaction handles, client identity, scopes, secrets, and PKCE.

pub mod handle;
pub mod identity;
pub mod pkce;
pub mod scope;
pub mod secret;

pub use handle::*;
pub use identity::*;
pub use pkce::*;
pub use scope::*;
pub use secret::*;
