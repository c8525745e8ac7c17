pub mod auth;
pub mod response;

pub use auth::{auth_context_middleware, bearer_token};
pub use response::{ApiResponse, ApiResult};
