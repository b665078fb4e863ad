mod login;
mod users;

pub use users::{Identity, UserDirectory};

use axum::{routing::post, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login::login))
}
