pub mod ring;
pub mod sampling;
