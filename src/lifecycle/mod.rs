pub mod mapping;

use serde::{Deserialize, Serialize};

use crate::appointments::{
    AppointmentKind, AppointmentStatus, active_appointments, classify_status, first_of_kind,
};
use crate::types::{RawAppointment, RawService};

pub const TOTAL_STAGES: u8 = 7;

/// Lifecycle position of a service order.
///
/// `Display`/`FromStr` use the backend token. Parsing also accepts the
/// accented form the backend stores in `etapa.nome` (e.g. `"ORÇAMENTO APROVADO"`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    #[strum(to_string = "PENDENTE")]
    Pendente,
    #[strum(
        to_string = "AGUARDANDO_ORCAMENTO",
        serialize = "AGUARDANDO ORÇAMENTO",
        serialize = "AGUARDANDO ORCAMENTO"
    )]
    AguardandoOrcamento,
    #[strum(
        to_string = "ANALISE_DO_ORCAMENTO",
        serialize = "ANÁLISE DO ORÇAMENTO",
        serialize = "ANALISE DO ORCAMENTO"
    )]
    AnaliseDoOrcamento,
    #[strum(
        to_string = "ORCAMENTO_APROVADO",
        serialize = "ORÇAMENTO APROVADO",
        serialize = "ORCAMENTO APROVADO"
    )]
    OrcamentoAprovado,
    #[strum(
        to_string = "SERVICO_AGENDADO",
        serialize = "SERVIÇO AGENDADO",
        serialize = "SERVICO AGENDADO"
    )]
    ServicoAgendado,
    #[strum(
        to_string = "SERVICO_EM_EXECUCAO",
        serialize = "SERVIÇO EM EXECUÇÃO",
        serialize = "SERVICO EM EXECUCAO"
    )]
    ServicoEmExecucao,
    #[strum(to_string = "CONCLUIDO", serialize = "CONCLUÍDO")]
    Concluido,
    #[strum(to_string = "CANCELADO")]
    Cancelado,
}

impl Stage {
    /// Non-cancelled stages in lifecycle order, followed by `Cancelado`.
    pub const ALL: [Stage; 8] = [
        Stage::Pendente,
        Stage::AguardandoOrcamento,
        Stage::AnaliseDoOrcamento,
        Stage::OrcamentoAprovado,
        Stage::ServicoAgendado,
        Stage::ServicoEmExecucao,
        Stage::Concluido,
        Stage::Cancelado,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Cancelado => 0,
            Self::Pendente => 1,
            Self::AguardandoOrcamento => 2,
            Self::AnaliseDoOrcamento => 3,
            Self::OrcamentoAprovado => 4,
            Self::ServicoAgendado => 5,
            Self::ServicoEmExecucao => 6,
            Self::Concluido => 7,
        }
    }

    pub fn progress(self) -> Progress {
        Progress(self.ordinal(), TOTAL_STAGES)
    }

    /// Parses a backend stage name, returning `None` for unknown tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        token.trim().parse().ok()
    }
}

/// `(current, total)`. Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress(pub u8, pub u8);

impl Progress {
    pub fn current(self) -> u8 {
        self.0
    }

    pub fn total(self) -> u8 {
        self.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageResolution {
    pub stage: Stage,
    pub progress: Progress,
}

impl From<Stage> for StageResolution {
    fn from(stage: Stage) -> Self {
        Self {
            stage,
            progress: stage.progress(),
        }
    }
}

pub struct LifecycleEngine;

impl LifecycleEngine {
    /// Resolves the current stage of a service from its recorded stage and its
    /// scheduling events. Total: every input yields a stage.
    pub fn resolve_stage(service: &RawService) -> StageResolution {
        let baseline = Self::baseline_stage(service.stage_name());
        let active = active_appointments(&service.appointments);

        let stage = if active.is_empty() {
            Stage::Pendente
        } else {
            let execution = first_of_kind(&active, AppointmentKind::Servico);
            let budget = first_of_kind(&active, AppointmentKind::Orcamento);
            match (execution, budget) {
                (Some(execution), _) => Self::execution_stage(execution),
                (None, Some(budget)) => Self::budget_stage(budget, baseline),
                (None, None) => baseline,
            }
        };

        tracing::trace!(
            service_id = ?service.id,
            %baseline,
            %stage,
            active = active.len(),
            "resolved service stage"
        );
        StageResolution::from(stage)
    }

    /// Backend's last-known stage. Missing or unknown names fall back to `Pendente`.
    pub fn baseline_stage(name: Option<&str>) -> Stage {
        let Some(name) = name else {
            return Stage::Pendente;
        };
        Stage::from_token(name).unwrap_or_else(|| {
            tracing::warn!(stage = name, "unrecognized backend stage, using PENDENTE");
            Stage::Pendente
        })
    }

    fn execution_stage(appt: &RawAppointment) -> Stage {
        match classify_status(appt) {
            Some(AppointmentStatus::Concluido) => Stage::Concluido,
            Some(AppointmentStatus::EmAndamento) => Stage::ServicoEmExecucao,
            _ => Stage::ServicoAgendado,
        }
    }

    fn budget_stage(appt: &RawAppointment, baseline: Stage) -> Stage {
        match classify_status(appt) {
            Some(AppointmentStatus::EmAndamento | AppointmentStatus::Pendente) => {
                Stage::AguardandoOrcamento
            }
            Some(AppointmentStatus::Concluido) => {
                if Self::preserves_manual_approval(baseline) {
                    Stage::OrcamentoAprovado
                } else {
                    Stage::AnaliseDoOrcamento
                }
            }
            _ => baseline,
        }
    }

    /// Approval is only ever set by a person; a concluded budget never
    /// downgrades it back to analysis.
    fn preserves_manual_approval(baseline: Stage) -> bool {
        let preserved = baseline == Stage::OrcamentoAprovado;
        if preserved {
            tracing::debug!("concluded budget keeps manually approved stage");
        }
        preserved
    }
}
