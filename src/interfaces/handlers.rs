pub mod home;
pub mod students;
pub mod files;
pub mod system;
