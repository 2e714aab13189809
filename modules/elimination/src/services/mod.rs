pub mod posting_service;
pub mod simulation_service;
