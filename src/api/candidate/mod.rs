pub mod dto;
pub mod handlers;
pub mod models;
pub mod service;
pub mod uploads;

pub use service::CandidateService;
