use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

use super::controller::{
    assign_subjects, assign_teacher, create_class, delete_class, generate_year_for_all,
    generate_year_for_class, get_class, get_classes, set_timetable, update_class,
};

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_classes).post(create_class))
        .route("/assign-teacher-to-a-subject", patch(assign_teacher))
        .route("/generate-new-year-for-classes", patch(generate_year_for_all))
        .route("/add-subjects/{id}", patch(assign_subjects))
        .route(
            "/generate-new-year-for-one-class/{id}",
            patch(generate_year_for_class),
        )
        .route("/generate-time-table/{id}", patch(set_timetable))
        .route(
            "/{id}",
            get(get_class).patch(update_class).delete(delete_class),
        )
}
