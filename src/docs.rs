use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use schoolyard_core::{PaginationMeta, PaginationParams};
use schoolyard_models::{
    AcademicYear, Admin, AssignSubjectsDto, AssignTeacherDto, BulkRolloverResponse, Class,
    ClassDetails, ClassSummary, CreateClassDto, CreateLevelDto, CreateStudentDto,
    CreateSubjectDto, CreateTeacherDto, DeleteClassResponse, DeleteLevelResponse,
    DeleteStudentResponse, DeleteSubjectResponse, DeleteTeacherResponse,
    GenerateAcademicYearDto, GenerateAcademicYearForAllDto, Level, LevelWithClasses,
    LoginRequest, LoginResponse, NewAcademicYearDto, PaginatedClassesResponse,
    PaginatedLevelsResponse, PaginatedStudentsResponse, PaginatedSubjectsResponse,
    PaginatedTeachersResponse, ParentInfo, RolloverResponse, SignupDto, SignupResponse, Student,
    StudentWithClass, Subject, SubjectSummary, SubjectWithTeachers, Teacher, TeacherAssignment,
    TeacherAssignmentSeed, TeacherSummary, TeacherWithSubjects, TimetableDto, UpdateClassDto,
    UpdateLevelDto, UpdateStudentDto, UpdateSubjectDto, UpdateTeacherDto, UserType, YearLabelDto,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::signup,
        crate::modules::auth::controller::login,
        crate::modules::levels::controller::create_level,
        crate::modules::levels::controller::get_levels,
        crate::modules::levels::controller::get_level,
        crate::modules::levels::controller::update_level,
        crate::modules::levels::controller::delete_level,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::assign_subjects,
        crate::modules::classes::controller::assign_teacher,
        crate::modules::classes::controller::generate_year_for_class,
        crate::modules::classes::controller::generate_year_for_all,
        crate::modules::classes::controller::set_timetable,
        crate::modules::classes::controller::delete_class,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::remove_teacher,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationMeta,
            PaginationParams,
            UserType,
            Admin,
            SignupDto,
            SignupResponse,
            LoginRequest,
            LoginResponse,
            Level,
            LevelWithClasses,
            CreateLevelDto,
            UpdateLevelDto,
            PaginatedLevelsResponse,
            DeleteLevelResponse,
            Class,
            ClassSummary,
            ClassDetails,
            AcademicYear,
            TeacherAssignment,
            TeacherAssignmentSeed,
            CreateClassDto,
            UpdateClassDto,
            AssignSubjectsDto,
            AssignTeacherDto,
            NewAcademicYearDto,
            GenerateAcademicYearDto,
            GenerateAcademicYearForAllDto,
            YearLabelDto,
            TimetableDto,
            RolloverResponse,
            BulkRolloverResponse,
            PaginatedClassesResponse,
            DeleteClassResponse,
            Subject,
            SubjectSummary,
            SubjectWithTeachers,
            CreateSubjectDto,
            UpdateSubjectDto,
            PaginatedSubjectsResponse,
            DeleteSubjectResponse,
            Teacher,
            TeacherSummary,
            TeacherWithSubjects,
            CreateTeacherDto,
            UpdateTeacherDto,
            PaginatedTeachersResponse,
            DeleteTeacherResponse,
            ParentInfo,
            Student,
            StudentWithClass,
            CreateStudentDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            DeleteStudentResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Admin signup and login for admins, teachers and students"),
        (name = "Levels", description = "Grade levels and their fees"),
        (name = "Classes", description = "Classes, academic years, teacher assignments and timetables"),
        (name = "Subjects", description = "Subjects and the teachers who teach them"),
        (name = "Teachers", description = "Teacher records"),
        (name = "Students", description = "Student records and enrollment")
    ),
    info(
        title = "Schoolyard API",
        version = "0.1.0",
        description = "School administration backend: levels, classes, academic years, subjects, teachers and students.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
