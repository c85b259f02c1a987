use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub is_available: bool,
}
