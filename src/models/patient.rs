use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::*;

/// Bedside vital signs, recorded free-form by whoever measured them.
/// `pa` is arterial pressure as written on the board ("120x80").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fc: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fr: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_at: Option<DateTime<Utc>>,
}

/// A ward patient record.
///
/// Stored as one JSON document per row; the wire shape is camelCase and
/// every timestamp is RFC 3339. The bookkeeping stamps (`*_at` fields) are
/// written exclusively by the flow layer when it observes the matching
/// field transition — handlers never set them directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u16>,
    pub medical_record: String,
    pub corridor: Corridor,
    pub specialty: Specialty,
    pub status: PatientStatus,
    #[serde(rename = "hasAIH")]
    pub has_aih: bool,
    pub pendencies: PendencyType,
    #[serde(default)]
    pub diagnosis: String,
    pub mobility: Mobility,
    #[serde(default)]
    pub has_allergy: bool,
    #[serde(default)]
    pub allergy_details: String,
    #[serde(default)]
    pub venous_access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venous_access_date: Option<NaiveDate>,
    #[serde(default)]
    pub has_prescription: bool,
    #[serde(default)]
    pub diet: Vec<DietType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabilities: Option<Vec<String>>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<VitalSigns>,
    pub has_bracelet: bool,
    pub has_bed_identification: bool,
    pub situation: Situation,
    #[serde(default)]
    pub has_lesion: bool,
    #[serde(default)]
    pub lesion_description: String,
    #[serde(default)]
    pub is_transfer_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_destination_sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_destination_bed: Option<String>,
    #[serde(default)]
    pub is_transferred: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_requested_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upa_transfer_requested_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_transfer_requested_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pendencies_resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferred_at: Option<DateTime<Utc>>,
    /// Highlight flag for supervisors; cleared when the list is reviewed.
    #[serde(default)]
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub last_modified_by: String,
    /// Optimistic write counter; full-record saves must present the
    /// version they read. Records written before versioning read as 1.
    #[serde(default = "default_version")]
    pub version: i64,
}

fn default_version() -> i64 {
    1
}

impl Patient {
    /// Archived records are excluded from active views and counters.
    pub fn is_active(&self) -> bool {
        !self.is_transferred
    }

    /// Badge predicate: anything still blocking this patient's flow —
    /// an open pendency, a missing bracelet, or a missing bed card.
    pub fn has_open_pendency(&self) -> bool {
        self.is_active()
            && (self.pendencies != PendencyType::Nenhuma
                || !self.has_bracelet
                || !self.has_bed_identification)
    }
}
