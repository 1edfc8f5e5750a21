//! # Schoolyard Models
//!
//! Records, aggregates and DTOs shared by the API server, the repositories
//! and the CLI.
//!
//! - [`ids`]: typed ids for every record
//! - [`classes`]: the [`Class`] aggregate with its academic years
//! - [`levels`], [`subjects`], [`teachers`], [`students`], [`admins`]
//! - [`auth`]: login and signup payloads
//!
//! ```ignore
//! use schoolyard_models::{Class, TeacherSlot};
//!
//! let class = Class::assemble(record, years, assignments);
//! match class.teacher_slot(year_id, subject_id)? {
//!     TeacherSlot::Existing(id) => { /* replace teacher */ }
//!     TeacherSlot::Vacant { position } => { /* insert */ }
//! }
//! ```

pub mod admins;
pub mod auth;
pub mod classes;
pub mod ids;
pub mod levels;
pub mod students;
pub mod subjects;
pub mod teachers;

pub use admins::{Admin, AdminCredentials, SignupDto};
pub use auth::{Claims, LoginRequest, LoginResponse, SignupResponse, UserType};
pub use classes::{
    AcademicYear, AcademicYearRecord, AssignSubjectsDto, AssignTeacherDto, BulkRolloverResponse,
    Class, ClassDetails, ClassRecord, ClassSummary, CreateClassDto, DeleteClassResponse,
    GenerateAcademicYearDto, GenerateAcademicYearForAllDto, NewAcademicYearDto,
    PaginatedClassesResponse, RolloverResponse, TeacherAssignment, TeacherAssignmentSeed,
    TeacherSlot, TimetableDto, UpdateClassDto, YearLabelDto,
};
pub use ids::{
    AcademicYearId, AdminId, ClassId, LevelId, StudentId, SubjectId, TeacherAssignmentId,
    TeacherId,
};
pub use levels::{
    CreateLevelDto, DeleteLevelResponse, Level, LevelWithClasses, PaginatedLevelsResponse,
    UpdateLevelDto,
};
pub use students::{
    CreateStudentDto, DeleteStudentResponse, PaginatedStudentsResponse, ParentInfo, Student,
    StudentCredentials, StudentWithClass, UpdateStudentDto,
};
pub use subjects::{
    CreateSubjectDto, DeleteSubjectResponse, PaginatedSubjectsResponse, Subject, SubjectSummary,
    SubjectWithTeachers, UpdateSubjectDto,
};
pub use teachers::{
    CreateTeacherDto, DeleteTeacherResponse, PaginatedTeachersResponse, Teacher,
    TeacherCredentials, TeacherSummary, TeacherWithSubjects, UpdateTeacherDto,
};
