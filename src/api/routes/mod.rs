pub mod astro_routes;
pub mod tide_routes;
pub mod weather_routes;
