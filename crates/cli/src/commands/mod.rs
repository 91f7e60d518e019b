pub mod author;
pub mod chat;
pub mod onboard;
pub mod preset;
pub mod render;
pub mod session_file;
pub mod status;
