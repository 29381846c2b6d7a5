use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::LeanSpecialty;

/// A lean-monitoring record: one row per emergency passage, with a stamp
/// per care stage as it happens. Stages that did not occur stay unset;
/// the record ends at either discharge or hospitalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeanPatient {
    pub id: String,
    pub name: String,
    pub age: u16,
    pub medical_record: String,
    pub specialty: LeanSpecialty,
    pub reception_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triage_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md_end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ct_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xray_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reevaluation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospitalization_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LeanPatient {
    /// A passage is closed once it ends in discharge or admission.
    pub fn is_closed(&self) -> bool {
        self.discharge_time.is_some() || self.hospitalization_time.is_some()
    }

    /// Door-to-doctor interval, when the doctor stage has been stamped.
    pub fn wait_for_doctor(&self) -> Option<chrono::Duration> {
        self.md_start_time.map(|md| md - self.reception_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, h, m, 0).unwrap()
    }

    fn sample() -> LeanPatient {
        LeanPatient {
            id: "lp-1".into(),
            name: "MARIA SOUZA".into(),
            age: 44,
            medical_record: "778899".into(),
            specialty: LeanSpecialty::Ortopedia,
            reception_time: t(8, 0),
            triage_start_time: Some(t(8, 10)),
            md_start_time: Some(t(8, 45)),
            md_end_time: Some(t(9, 0)),
            lab_time: None,
            ct_time: None,
            xray_time: Some(t(9, 30)),
            medication_time: None,
            reevaluation_time: None,
            discharge_time: None,
            hospitalization_time: None,
            created_at: t(8, 0),
        }
    }

    #[test]
    fn wait_for_doctor_measures_from_reception() {
        let lp = sample();
        assert_eq!(lp.wait_for_doctor().unwrap().num_minutes(), 45);
    }

    #[test]
    fn closed_only_after_outcome_stamp() {
        let mut lp = sample();
        assert!(!lp.is_closed());
        lp.discharge_time = Some(t(11, 0));
        assert!(lp.is_closed());
    }

    #[test]
    fn unset_stages_are_absent_on_the_wire() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("labTime").is_none());
        assert!(json.get("xrayTime").is_some());
        assert!(json.get("receptionTime").is_some());
    }
}
