pub mod astro;
pub mod openweather;
pub mod worldtides;
