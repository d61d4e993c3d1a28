pub mod astro;
pub mod tide;
pub mod weather;
