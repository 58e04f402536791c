pub mod booking;
pub mod directory;
