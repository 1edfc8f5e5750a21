//! Typed table access.
//!
//! One unit struct per table with associated async functions. They return
//! raw [`sqlx::Error`]s; mapping to API errors happens in the services.

mod admins;
mod classes;
mod levels;
mod students;
mod subjects;
mod teachers;

pub use admins::AdminRepository;
pub use classes::ClassRepository;
pub use levels::LevelRepository;
pub use students::StudentRepository;
pub use subjects::SubjectRepository;
pub use teachers::TeacherRepository;
