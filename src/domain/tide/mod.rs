pub mod gate;
pub mod model;
pub mod service;
