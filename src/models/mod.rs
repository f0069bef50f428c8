pub mod classify_types;
pub mod shelf_life_types;
pub mod weather_types;
