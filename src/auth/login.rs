use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::AppResult;

use super::{Identity, UserDirectory};

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    username: String,
    password: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    State(users): State<UserDirectory>,
    Json(LoginQuery { username, password }): Json<LoginQuery>,
) -> AppResult<Json<Identity>> {
    let identity = users.authenticate(&username, &password)?;
    info!("login for {}", identity.name());
    Ok(Json(identity))
}
