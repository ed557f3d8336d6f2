use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub kind: String,
    pub plate_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub vehicle: Vehicle,
    pub license_number: String,
    pub address: String,
    pub is_available: bool,
    /// 0 means unrated.
    pub rating: f64,
    pub completed_deliveries: u32,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverSummary {
    pub id: Uuid,
    pub name: String,
    pub vehicle_type: String,
    pub rating: f64,
    pub completed_deliveries: u32,
    pub phone: String,
    pub email: String,
    pub license_number: String,
    pub plate_number: String,
}

impl From<&Driver> for DriverSummary {
    fn from(driver: &Driver) -> Self {
        Self {
            id: driver.id,
            name: driver.name.clone(),
            vehicle_type: driver.vehicle.kind.clone(),
            rating: driver.rating,
            completed_deliveries: driver.completed_deliveries,
            phone: driver.phone.clone(),
            email: driver.email.clone(),
            license_number: driver.license_number.clone(),
            plate_number: driver.vehicle.plate_number.clone(),
        }
    }
}
