pub mod language;
pub mod lesson;
pub mod note;
pub mod notify;
pub mod server;
