pub mod auth;
pub mod policy;
pub mod submissions;

pub use auth::AuthService;
pub use submissions::SubmissionService;
