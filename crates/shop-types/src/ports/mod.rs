pub mod repository;
pub mod upstream;
