// Wait-time observation domain models
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacilityId(String);

impl FacilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One sampled wait time for a facility, in park-local wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub facility_id: FacilityId,
    pub observed_at: NaiveDateTime,
    pub wait_minutes: Option<u32>,
}

impl Observation {
    pub fn new(facility_id: FacilityId, observed_at: NaiveDateTime, wait_minutes: Option<u32>) -> Self {
        Self {
            facility_id,
            observed_at,
            wait_minutes,
        }
    }

    /// Same facility and value, shifted to another instant
    pub fn carried_to(&self, observed_at: NaiveDateTime) -> Self {
        Self {
            facility_id: self.facility_id.clone(),
            observed_at,
            wait_minutes: self.wait_minutes,
        }
    }
}

/// Ticket sale state for paid (DPA) and free (Priority Pass) fast-track passes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PassStatus {
    OnSale,
    Ended,
    Other(String),
    #[default]
    Absent,
}

impl PassStatus {
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            None | Some("") => PassStatus::Absent,
            Some("1") => PassStatus::OnSale,
            Some("2") => PassStatus::Ended,
            Some(other) => PassStatus::Other(other.to_string()),
        }
    }

    pub fn is_on_sale(&self) -> bool {
        matches!(self, PassStatus::OnSale)
    }
}

/// Operating status code the backend uses when the standby queue is closed
pub const LINE_CUT_STATUS_CODE: &str = "045";

/// One backend row: the observation plus the descriptive columns shown in panels.
#[derive(Debug, Clone, PartialEq)]
pub struct AttractionLog {
    pub observation: Observation,
    pub kana_name: Option<String>,
    pub operating_status: Option<String>,
    pub operating_hours_from: Option<String>,
    pub operating_hours_to: Option<String>,
    pub update_time: Option<String>,
    pub dpa_status: PassStatus,
    pub pp_status: PassStatus,
    pub operating_status_code: Option<String>,
}

impl AttractionLog {
    pub fn facility_id(&self) -> &FacilityId {
        &self.observation.facility_id
    }

    pub fn is_line_cut(&self) -> bool {
        self.operating_status_code.as_deref() == Some(LINE_CUT_STATUS_CODE)
    }
}
