use serde::{Deserialize, Serialize};

use crate::types::RawAppointment;

/// Appointment type. Tokens are case- and accent-sensitive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum AppointmentKind {
    /// Budget visit.
    #[strum(serialize = "ORCAMENTO")]
    #[serde(rename = "ORCAMENTO")]
    Orcamento,
    /// Execution of the service itself.
    #[strum(serialize = "SERVICO")]
    #[serde(rename = "SERVICO")]
    Servico,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum AppointmentStatus {
    #[strum(serialize = "PENDENTE")]
    #[serde(rename = "PENDENTE")]
    Pendente,
    #[strum(serialize = "EM ANDAMENTO")]
    #[serde(rename = "EM ANDAMENTO")]
    EmAndamento,
    #[strum(serialize = "CONCLUÍDO")]
    #[serde(rename = "CONCLUÍDO")]
    Concluido,
    #[strum(serialize = "CANCELADO")]
    #[serde(rename = "CANCELADO")]
    Cancelado,
    #[strum(serialize = "INATIVO")]
    #[serde(rename = "INATIVO")]
    Inativo,
}

impl AppointmentStatus {
    pub fn is_withdrawn(self) -> bool {
        matches!(self, Self::Cancelado | Self::Inativo)
    }
}

pub fn classify_kind(appt: &RawAppointment) -> Option<AppointmentKind> {
    appt.kind.as_deref()?.parse().ok()
}

/// `None` both when the status is missing and when the token is unknown.
pub fn classify_status(appt: &RawAppointment) -> Option<AppointmentStatus> {
    appt.status_name()?.parse().ok()
}

/// An appointment counts as evidence only if it has a non-blank status and
/// that status is neither `CANCELADO` nor `INATIVO`. Unknown status tokens are
/// active.
pub fn is_active(appt: &RawAppointment) -> bool {
    match appt.status_name() {
        None => false,
        Some(name) if name.trim().is_empty() => false,
        Some(name) => !name
            .parse::<AppointmentStatus>()
            .is_ok_and(AppointmentStatus::is_withdrawn),
    }
}

pub fn active_appointments(appts: &[RawAppointment]) -> Vec<&RawAppointment> {
    appts.iter().filter(|a| is_active(a)).collect()
}

/// First active appointment of the given kind, in list order.
pub fn first_of_kind<'a>(
    active: &[&'a RawAppointment],
    kind: AppointmentKind,
) -> Option<&'a RawAppointment> {
    active
        .iter()
        .copied()
        .find(|a| classify_kind(a) == Some(kind))
}

/// History entry for the view. Includes appointments ignored by stage inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub id: Option<i64>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub scheduled_for: Option<String>,
    pub active: bool,
}

impl From<&RawAppointment> for AppointmentSummary {
    fn from(appt: &RawAppointment) -> Self {
        Self {
            id: appt.id,
            kind: appt.kind.clone(),
            status: appt.status_name().map(str::to_string),
            scheduled_for: appt.scheduled_for.clone(),
            active: is_active(appt),
        }
    }
}
