pub mod branch;
pub mod describe;
