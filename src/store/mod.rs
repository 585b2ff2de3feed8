//! Data store modules backed by the in-process relational table set

pub mod db;
pub mod games;
pub mod leagues;
pub mod players;
pub mod teams;
pub mod users;

pub use db::{Database, StoreError};
pub use games::GameStore;
pub use leagues::LeagueStore;
pub use players::PlayerStore;
pub use teams::TeamStore;
pub use users::UserStore;
