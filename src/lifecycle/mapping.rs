use crate::lifecycle::Stage;

impl Stage {
    /// Localized display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pendente => "Pendente",
            Self::AguardandoOrcamento => "Aguardando Orçamento",
            Self::AnaliseDoOrcamento => "Análise do Orçamento",
            Self::OrcamentoAprovado => "Orçamento Aprovado",
            Self::ServicoAgendado => "Serviço Agendado",
            Self::ServicoEmExecucao => "Serviço em Execução",
            Self::Concluido => "Concluído",
            Self::Cancelado => "Cancelado",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    /// Badge colour used by list and kanban views.
    pub fn color(self) -> &'static str {
        match self {
            Self::Pendente => "#9E9E9E",
            Self::AguardandoOrcamento => "#FFB300",
            Self::AnaliseDoOrcamento => "#FB8C00",
            Self::OrcamentoAprovado => "#43A047",
            Self::ServicoAgendado => "#1E88E5",
            Self::ServicoEmExecucao => "#5E35B1",
            Self::Concluido => "#2E7D32",
            Self::Cancelado => "#E53935",
        }
    }

    /// Accepts either a backend token or a display label.
    pub fn parse_any(value: &str) -> Option<Self> {
        Self::from_token(value).or_else(|| Self::from_label(value))
    }
}

/// Order-level status as reported by the backend in `status.nome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Ativo,
    Finalizado,
    EmAndamento,
    Cancelado,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Ativo,
        OrderStatus::Finalizado,
        OrderStatus::EmAndamento,
        OrderStatus::Cancelado,
    ];

    pub fn from_backend(nome: &str) -> Option<Self> {
        match nome {
            "ATIVO" => Some(Self::Ativo),
            "FINALIZADO" => Some(Self::Finalizado),
            "PENDENTE" => Some(Self::EmAndamento),
            "CANCELADO" => Some(Self::Cancelado),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ativo => "Ativo",
            Self::Finalizado => "Finalizado",
            Self::EmAndamento => "Em Andamento",
            Self::Cancelado => "Cancelado",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Ativo => "#1E88E5",
            Self::Finalizado => "#2E7D32",
            Self::EmAndamento => "#FFB300",
            Self::Cancelado => "#E53935",
        }
    }
}

/// Maps a backend status name to its display label. Unknown names pass through.
pub fn normalize_status(nome: &str) -> String {
    OrderStatus::from_backend(nome).map_or_else(|| nome.to_string(), |s| s.label().to_string())
}

/// Colour for an already-normalized status label; neutral grey when unknown.
pub fn status_color(label: &str) -> &'static str {
    OrderStatus::from_label(label).map_or("#9E9E9E", OrderStatus::color)
}
