pub mod board;
pub mod moves;
