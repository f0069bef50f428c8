pub mod classifier;
pub mod http;
pub mod location;
pub mod orchestrator;
pub mod shelf_life_client;
pub mod weather_client;
