pub mod boardpack_service;
pub mod snapshot_service;
