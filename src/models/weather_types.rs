use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions at the user's location, as shown next to a prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub temp_c: f64,
    pub humidity_pct: i32,
}

// OpenWeatherMap `data/2.5/weather` body; only the fields we read.
#[derive(Debug, Deserialize)]
pub struct WeatherResponse {
    pub main: WeatherMain,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct WeatherMain {
    pub temp: f64,
    pub humidity: i32,
}

impl From<WeatherResponse> for WeatherReport {
    fn from(resp: WeatherResponse) -> Self {
        WeatherReport {
            city: resp.name,
            temp_c: resp.main.temp,
            humidity_pct: resp.main.humidity,
        }
    }
}
