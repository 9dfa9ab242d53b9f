pub mod history_service;
pub mod loader_service;
pub mod scoring_service;
pub mod session_service;
