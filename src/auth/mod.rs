pub mod context;
pub mod gate;
pub mod password;
pub mod role;
pub mod token;

pub use context::AuthContext;
pub use gate::{authorize, AccessDenied, AllowList};
pub use role::Role;
pub use token::{TokenClaims, TokenCodec, TokenError};
