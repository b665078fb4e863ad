pub mod appresult;
pub mod auth;
pub mod db;
pub mod events;
pub mod fanout;
pub mod registry;
pub mod rooms;
pub mod store;

use axum::extract::FromRef;

pub use appresult::{AppError, AppResult};

use auth::UserDirectory;
use fanout::FanoutEngine;
use registry::RoomRegistry;
use store::MessageStore;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: MessageStore,
    pub registry: RoomRegistry,
    pub fanout: FanoutEngine,
    pub users: UserDirectory,
}
