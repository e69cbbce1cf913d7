use serde::{ Serialize, Deserialize };

/// One bookable meeting type. Calendly's own event-type objects carry
/// these fields among many others; the rest are dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    pub name: Option<String>,
    pub scheduling_url: Option<String>,
    pub duration: Option<u64>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventTypesResponse {
    pub event_types: Vec<EventType>,
}
