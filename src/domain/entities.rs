pub mod student;
pub mod stored_file;
