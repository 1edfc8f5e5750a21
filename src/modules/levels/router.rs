use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_level, delete_level, get_level, get_levels, update_level};

pub fn init_levels_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_levels).post(create_level))
        .route(
            "/{id}",
            get(get_level).patch(update_level).delete(delete_level),
        )
}
