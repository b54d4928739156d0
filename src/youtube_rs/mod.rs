pub mod playlist;
pub mod types;
