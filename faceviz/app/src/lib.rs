pub mod drivers;
pub mod strategies;
