pub mod monitor;
pub mod preferences;
pub mod scan;
pub mod sensors;
