pub mod optimize;
pub mod simulate;
pub mod sweep;
