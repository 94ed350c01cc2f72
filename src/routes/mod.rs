pub mod blog;
pub mod contacts;
