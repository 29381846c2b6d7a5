//! Board aggregates — badge counters, the census figures, and the
//! consolidated monthly report.
//!
//! Everything here is a pure pass over the patient collection; handlers
//! load the records and hand them in. Census figures cover the active
//! board only, while the monthly report buckets every record created in
//! the month, archived ones included.

use serde::Serialize;

use crate::models::{Patient, PatientStatus, PendencyType, Role, Situation, Specialty};

/// The three sidebar badges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCounts {
    pub pendency_count: usize,
    pub transfer_request_count: usize,
    pub new_patients_count: usize,
}

/// Occupancy and flow figures for the active board.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WardCensus {
    pub total: usize,
    pub internados: usize,
    pub observacao: usize,
    pub reavaliacao: usize,
    pub pendencias: usize,
    pub macas: usize,
    pub cadeiras: usize,
    pub gargalos: usize,
    pub specialties: Vec<SpecialtyCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialtyCount {
    pub name: String,
    pub value: usize,
}

/// Consolidated figures for one calendar month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub month: String,
    pub total: usize,
    pub altas: usize,
    pub upa: usize,
    pub externo: usize,
    pub internas: usize,
    pub observacao: usize,
    pub internados: usize,
    pub pendencias: usize,
    pub specialties: Vec<SpecialtyCount>,
}

pub fn badge_counts(patients: &[Patient]) -> BadgeCounts {
    BadgeCounts {
        pendency_count: patients.iter().filter(|p| p.has_open_pendency()).count(),
        transfer_request_count: patients
            .iter()
            .filter(|p| p.is_transfer_requested && p.is_active())
            .count(),
        new_patients_count: patients
            .iter()
            .filter(|p| p.is_new && p.is_active())
            .count(),
    }
}

/// Whether to nag this session about open pendencies. Technicians and
/// nurses get the reminder; coordination does not.
pub fn pendency_reminder(role: &Role, badges: &BadgeCounts) -> bool {
    matches!(role, Role::Tecnico | Role::Enfermeiro) && badges.pendency_count > 0
}

pub fn ward_census(patients: &[Patient]) -> WardCensus {
    let active: Vec<&Patient> = patients.iter().filter(|p| p.is_active()).collect();
    WardCensus {
        total: active.len(),
        internados: active
            .iter()
            .filter(|p| p.status == PatientStatus::Internado)
            .count(),
        observacao: active
            .iter()
            .filter(|p| p.status == PatientStatus::Observacao)
            .count(),
        reavaliacao: active
            .iter()
            .filter(|p| p.status == PatientStatus::Reavaliacao)
            .count(),
        pendencias: active.iter().filter(|p| p.has_open_pendency()).count(),
        macas: active
            .iter()
            .filter(|p| p.situation == Situation::Maca)
            .count(),
        cadeiras: active
            .iter()
            .filter(|p| p.situation == Situation::Cadeira)
            .count(),
        gargalos: active.iter().filter(|p| p.pendencies.is_bottleneck()).count(),
        specialties: specialty_distribution(&active),
    }
}

/// Figures for the month given as "YYYY-MM", over every patient created
/// in it. The report covers outcomes, so archived records count too.
pub fn monthly_report(patients: &[Patient], month: &str) -> MonthlyReport {
    let monthly: Vec<&Patient> = patients
        .iter()
        .filter(|p| p.created_at.format("%Y-%m").to_string() == month)
        .collect();

    MonthlyReport {
        month: month.to_string(),
        total: monthly.len(),
        altas: monthly
            .iter()
            .filter(|p| p.status == PatientStatus::Alta)
            .count(),
        upa: monthly
            .iter()
            .filter(|p| p.status == PatientStatus::TransferenciaUpa)
            .count(),
        externo: monthly
            .iter()
            .filter(|p| p.status == PatientStatus::TransferenciaExterna)
            .count(),
        internas: monthly
            .iter()
            .filter(|p| p.is_transfer_requested && !p.status.is_transfer())
            .count(),
        observacao: monthly
            .iter()
            .filter(|p| p.status == PatientStatus::Observacao)
            .count(),
        internados: monthly
            .iter()
            .filter(|p| p.status == PatientStatus::Internado)
            .count(),
        pendencias: monthly
            .iter()
            .filter(|p| p.pendencies != PendencyType::Nenhuma)
            .count(),
        specialties: specialty_distribution(&monthly),
    }
}

/// Per-specialty counts, zero entries dropped, busiest first. The sort is
/// stable, so ties keep the charted specialty order.
fn specialty_distribution(patients: &[&Patient]) -> Vec<SpecialtyCount> {
    let mut data: Vec<SpecialtyCount> = Specialty::ALL
        .iter()
        .map(|s| SpecialtyCount {
            name: s.as_str().to_string(),
            value: patients.iter().filter(|p| p.specialty == *s).count(),
        })
        .filter(|d| d.value > 0)
        .collect();
    data.sort_by(|a, b| b.value.cmp(&a.value));
    data
}
