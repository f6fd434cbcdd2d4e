pub mod attendance;
pub mod auth;
pub mod classroom_students;
pub mod classrooms;
pub mod files;
pub mod system;

pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use classroom_students::ClassroomStudentService;
pub use classrooms::ClassroomService;
pub use files::FileService;
pub use system::SystemService;
