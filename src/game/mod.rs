//! Match simulation modules

pub mod arena;
pub mod catch;
pub mod generator;
pub mod lineup;
pub mod performance;
pub mod positioning;
pub mod service;

pub use service::GameService;
