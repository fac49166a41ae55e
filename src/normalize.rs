use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::appointments::AppointmentSummary;
use crate::error::Error;
use crate::lifecycle::mapping::normalize_status;
use crate::lifecycle::{LifecycleEngine, Progress, Stage};
use crate::types::{NormalizeContext, RawCliente, RawOrder, RawService, RawStatus};

pub const NOT_INFORMED: &str = "Não informado";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderType {
    Produto,
    Servico,
}

impl OrderType {
    /// Reads `tipoPedido`. Unknown values are decided by whether a service
    /// payload is attached.
    pub fn classify(raw: &RawOrder) -> Self {
        match raw.order_type.as_deref().map(str::trim) {
            Some("serviço" | "servico" | "SERVIÇO" | "SERVICO") => Self::Servico,
            Some("produto" | "PRODUTO") => Self::Produto,
            other => {
                let fallback = if raw.service.is_some() {
                    Self::Servico
                } else {
                    Self::Produto
                };
                tracing::debug!(
                    order_id = raw.id,
                    order_type = ?other,
                    %fallback,
                    "unrecognized order type"
                );
                fallback
            }
        }
    }
}

/// Presentation-ready projection of one order.
///
/// Product orders carry no stage: `stage`, `stage_label` and `progress` are
/// all `None`. Service orders always carry all three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: i64,
    pub display_id: String,
    pub cliente_nome: String,
    pub cliente_info: String,
    pub items_description: String,
    pub item_count: usize,
    pub description: String,
    pub purchase_date: NaiveDate,
    pub payment_method: String,
    pub total_value: Decimal,
    pub status: String,
    pub active: bool,
    pub order_type: OrderType,
    pub stage: Option<Stage>,
    pub stage_label: Option<String>,
    pub progress: Option<Progress>,
    pub service_code: Option<String>,
    pub appointments: Vec<AppointmentSummary>,
    pub raw_status: Option<RawStatus>,
}

impl OrderView {
    pub fn is_service(&self) -> bool {
        self.order_type == OrderType::Servico
    }
}

pub fn display_id(id: i64) -> String {
    format!("#{id:04}")
}

/// Builds the view for one order. Never fails; missing fields get defaults.
pub fn normalize(raw: &RawOrder, ctx: &NormalizeContext) -> OrderView {
    let order_type = OrderType::classify(raw);
    let (cliente_nome, cliente_info) = client_fields(raw.client.as_ref());
    let status = raw
        .status
        .as_ref()
        .and_then(|s| s.nome.as_deref())
        .map(normalize_status)
        .unwrap_or_default();

    let mut view = OrderView {
        id: raw.id,
        display_id: display_id(raw.id),
        cliente_nome,
        cliente_info,
        items_description: String::new(),
        item_count: 0,
        description: non_empty(raw.notes.as_deref()).unwrap_or_default(),
        purchase_date: purchase_date(raw, ctx),
        payment_method: non_empty(raw.payment_method.as_deref())
            .unwrap_or_else(|| NOT_INFORMED.to_string()),
        total_value: raw.total_value.unwrap_or(Decimal::ZERO),
        status,
        active: raw.active,
        order_type,
        stage: None,
        stage_label: None,
        progress: None,
        service_code: None,
        appointments: Vec::new(),
        raw_status: raw.status.clone(),
    };

    match order_type {
        OrderType::Produto => {
            view.items_description = raw
                .products
                .iter()
                .filter_map(|line| non_empty(line.name.as_deref()))
                .collect::<Vec<_>>()
                .join(", ");
            view.item_count = raw.products.len();
        }
        OrderType::Servico => {
            let default_service = RawService::default();
            let service = raw.service.as_ref().unwrap_or(&default_service);
            apply_service(&mut view, service);
        }
    }

    view
}

fn apply_service(view: &mut OrderView, service: &RawService) {
    let resolution = LifecycleEngine::resolve_stage(service);
    view.items_description = non_empty(service.name.as_deref()).unwrap_or_default();
    view.item_count = 1;
    if view.description.is_empty() {
        view.description = non_empty(service.description.as_deref()).unwrap_or_default();
    }
    view.stage = Some(resolution.stage);
    view.stage_label = Some(resolution.stage.label().to_string());
    view.progress = Some(resolution.progress);
    view.service_code = non_empty(service.code.as_deref());
    view.appointments = service
        .appointments
        .iter()
        .map(AppointmentSummary::from)
        .collect();
}

pub fn normalize_all(raws: &[RawOrder], ctx: &NormalizeContext) -> Vec<OrderView> {
    raws.iter().map(|raw| normalize(raw, ctx)).collect()
}

/// Parses a JSON array of orders and normalizes each one.
pub fn normalize_json(json: &str, ctx: &NormalizeContext) -> Result<Vec<OrderView>, Error> {
    let raws: Vec<RawOrder> = serde_json::from_str(json)?;
    Ok(normalize_all(&raws, ctx))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn client_fields(client: Option<&RawCliente>) -> (String, String) {
    let Some(client) = client else {
        return (NOT_INFORMED.to_string(), NOT_INFORMED.to_string());
    };
    let name = non_empty(client.name.as_deref()).unwrap_or_else(|| NOT_INFORMED.to_string());
    let info = [&client.cpf, &client.email, &client.phone]
        .into_iter()
        .find_map(|v| non_empty(v.as_deref()))
        .unwrap_or_else(|| NOT_INFORMED.to_string());
    (name, info)
}

fn purchase_date(raw: &RawOrder, ctx: &NormalizeContext) -> NaiveDate {
    let Some(value) = non_empty(raw.purchase_date.as_deref()) else {
        tracing::debug!(order_id = raw.id, "missing purchase date, using reference date");
        return ctx.today;
    };
    parse_date(&value).unwrap_or_else(|| {
        tracing::debug!(
            order_id = raw.id,
            %value,
            "unparseable purchase date, using reference date"
        );
        ctx.today
    })
}

/// Accepts `YYYY-MM-DD`, RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::types::{RawAppointment, RawAppointmentStatus, RawEtapa, RawOrderLine};

    fn ctx() -> NormalizeContext {
        NormalizeContext::new(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
    }

    fn line(name: &str) -> RawOrderLine {
        RawOrderLine {
            name: Some(name.to_string()),
            ..RawOrderLine::default()
        }
    }

    fn product_order() -> RawOrder {
        RawOrder {
            id: 42,
            order_type: Some("produto".to_string()),
            total_value: Some(Decimal::new(15_050, 2)),
            active: true,
            payment_method: Some("PIX".to_string()),
            purchase_date: Some("2024-11-02".to_string()),
            client: Some(RawCliente {
                name: Some("Maria Souza".to_string()),
                email: Some("maria@example.com".to_string()),
                ..RawCliente::default()
            }),
            status: Some(RawStatus {
                tipo: Some("PEDIDO".to_string()),
                nome: Some("ATIVO".to_string()),
            }),
            products: vec![line("Filtro de óleo"), line("Vela"), line("  ")],
            ..RawOrder::default()
        }
    }

    fn service_order(stage: &str, appts: &[(&str, &str)]) -> RawOrder {
        RawOrder {
            id: 7,
            order_type: Some("serviço".to_string()),
            status: Some(RawStatus {
                tipo: None,
                nome: Some("PENDENTE".to_string()),
            }),
            service: Some(RawService {
                code: Some("SRV-01".to_string()),
                name: Some("Instalação de ar-condicionado".to_string()),
                stage: Some(RawEtapa {
                    nome: Some(stage.to_string()),
                }),
                appointments: appts
                    .iter()
                    .map(|(kind, status)| RawAppointment {
                        kind: Some((*kind).to_string()),
                        status: Some(RawAppointmentStatus {
                            nome: Some((*status).to_string()),
                        }),
                        ..RawAppointment::default()
                    })
                    .collect(),
                ..RawService::default()
            }),
            ..RawOrder::default()
        }
    }

    #[test]
    fn product_order_has_no_stage() {
        let view = normalize(&product_order(), &ctx());
        assert_eq!(view.order_type, OrderType::Produto);
        assert_eq!(view.items_description, "Filtro de óleo, Vela");
        assert_eq!(view.item_count, 3);
        assert_eq!(view.stage, None);
        assert_eq!(view.stage_label, None);
        assert_eq!(view.progress, None);
        assert_eq!(view.status, "Ativo");
        assert_eq!(view.cliente_info, "maria@example.com");
        assert_eq!(view.display_id, "#0042");
        assert_eq!(
            view.purchase_date,
            NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()
        );
        assert_eq!(view.total_value, Decimal::new(15_050, 2));
    }

    #[test]
    fn service_order_resolves_stage() {
        let view = normalize(
            &service_order("PENDENTE", &[("SERVICO", "EM ANDAMENTO")]),
            &ctx(),
        );
        assert_eq!(view.order_type, OrderType::Servico);
        assert_eq!(view.items_description, "Instalação de ar-condicionado");
        assert_eq!(view.item_count, 1);
        assert_eq!(view.stage, Some(Stage::ServicoEmExecucao));
        assert_eq!(view.stage_label.as_deref(), Some("Serviço em Execução"));
        assert_eq!(view.progress, Some(Progress(6, 7)));
        assert_eq!(view.status, "Em Andamento");
        assert_eq!(view.service_code.as_deref(), Some("SRV-01"));
    }

    #[test]
    fn history_keeps_withdrawn_appointments() {
        let view = normalize(
            &service_order(
                "ORÇAMENTO APROVADO",
                &[("ORCAMENTO", "CANCELADO"), ("ORCAMENTO", "CONCLUÍDO")],
            ),
            &ctx(),
        );
        assert_eq!(view.stage, Some(Stage::OrcamentoAprovado));
        assert_eq!(view.appointments.len(), 2);
        assert!(!view.appointments[0].active);
        assert!(view.appointments[1].active);
    }

    #[test]
    fn empty_order_gets_safe_defaults() {
        let view = normalize(&RawOrder::default(), &ctx());
        assert_eq!(view.order_type, OrderType::Produto);
        assert_eq!(view.cliente_nome, NOT_INFORMED);
        assert_eq!(view.cliente_info, NOT_INFORMED);
        assert_eq!(view.payment_method, NOT_INFORMED);
        assert_eq!(view.total_value, Decimal::ZERO);
        assert_eq!(view.status, "");
        assert_eq!(view.purchase_date, ctx().today);
        assert_eq!(view.item_count, 0);
        assert_eq!(view.raw_status, None);
    }

    #[test]
    fn service_order_without_payload_is_pending() {
        let raw = RawOrder {
            order_type: Some("serviço".to_string()),
            ..RawOrder::default()
        };
        let view = normalize(&raw, &ctx());
        assert_eq!(view.stage, Some(Stage::Pendente));
        assert_eq!(view.progress, Some(Progress(1, 7)));
        assert_eq!(view.items_description, "");
        assert_eq!(view.item_count, 1);
    }

    #[test]
    fn unknown_order_type_follows_payload() {
        let mut raw = service_order("PENDENTE", &[]);
        raw.order_type = Some("assinatura".to_string());
        assert_eq!(OrderType::classify(&raw), OrderType::Servico);
        raw.service = None;
        assert_eq!(OrderType::classify(&raw), OrderType::Produto);
    }

    #[test]
    fn purchase_date_formats() {
        assert_eq!(
            parse_date("2024-05-06T13:45:00Z"),
            NaiveDate::from_ymd_opt(2024, 5, 6)
        );
        assert_eq!(
            parse_date("2024-05-06T13:45:00.123"),
            NaiveDate::from_ymd_opt(2024, 5, 6)
        );
        assert_eq!(parse_date("06/05/2024"), None);

        let mut raw = product_order();
        raw.purchase_date = Some("ontem".to_string());
        assert_eq!(normalize(&raw, &ctx()).purchase_date, ctx().today);
    }

    #[test]
    fn normalization_is_pure() {
        let raw = service_order("ORÇAMENTO APROVADO", &[("ORCAMENTO", "CONCLUÍDO")]);
        let snapshot = raw.clone();
        let first = normalize(&raw, &ctx());
        let second = normalize(&raw, &ctx());
        assert_eq!(first, second);
        assert_eq!(raw, snapshot);
    }

    #[test]
    fn normalize_json_reports_malformed_payload() {
        assert!(matches!(
            normalize_json("{\"id\": 1}", &ctx()),
            Err(Error::Json(_))
        ));
        let views = normalize_json("[{\"id\": 1, \"tipoPedido\": \"produto\"}]", &ctx()).unwrap();
        assert_eq!(views.len(), 1);
    }

    #[test]
    fn view_serializes_camel_case() {
        let view = normalize(
            &service_order("PENDENTE", &[("SERVICO", "EM ANDAMENTO")]),
            &ctx(),
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["orderType"], "servico");
        assert_eq!(json["stage"], "SERVICO_EM_EXECUCAO");
        assert_eq!(json["progress"], serde_json::json!([6, 7]));
        assert_eq!(json["clienteNome"], NOT_INFORMED);
        assert_eq!(json["purchaseDate"], "2025-01-15");
    }
}
