pub mod auth;
pub mod common;
pub mod submissions;
pub mod users;

pub use common::error_code::ErrorCode;
pub use common::response::ApiResponse;
