pub mod astro;
pub mod gate;
pub mod tide;
pub mod weather;
