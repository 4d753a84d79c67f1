pub mod connection;
pub mod node;
pub mod topology;
