pub mod diagram;
pub mod workspace;
