pub mod profile;
pub mod suggestion;
