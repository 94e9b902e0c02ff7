pub mod forms;
pub mod media;
pub mod models;
