pub mod movement_service;
pub mod revaluation_service;
