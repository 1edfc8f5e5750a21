use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

use super::controller::{
    create_subject, delete_subject, get_subject, get_subjects, remove_teacher, update_subject,
};

pub fn init_subjects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_subjects).post(create_subject))
        .route(
            "/{id}",
            get(get_subject).patch(update_subject).delete(delete_subject),
        )
        .route("/{id}/{teacher_id}", patch(remove_teacher))
}
