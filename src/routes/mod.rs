pub mod attendance;

pub mod auth;

pub mod classroom_students;

pub mod classrooms;

pub mod files;

pub mod system;

pub use attendance::configure_attendance_routes;
pub use auth::configure_auth_routes;
pub use classroom_students::configure_classroom_student_routes;
pub use classrooms::configure_classroom_routes;
pub use files::configure_file_routes;
pub use system::configure_system_routes;
