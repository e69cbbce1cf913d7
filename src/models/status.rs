use serde::{ Serialize, Deserialize };

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatesResponse {
    pub fixed_rate: Option<f64>,
    pub variable_rate: Option<f64>,
    pub three_year_fixed_rate: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub api_configured: bool,
}
