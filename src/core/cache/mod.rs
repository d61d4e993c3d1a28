pub mod cell;
pub mod memo;
