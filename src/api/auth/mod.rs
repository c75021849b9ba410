pub mod extractor;
pub mod handlers;
pub mod models;
pub mod password;
pub mod service;

pub use models::Actor;
pub use service::AuthService;
