pub mod loss;
pub mod power_map;
