use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// Treats an explicit JSON `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An order row (`pedido`) as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawOrder {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    /// `"produto"` or `"serviço"`.
    #[serde(rename = "tipoPedido", default)]
    pub order_type: Option<String>,
    #[serde(rename = "valorTotal", default)]
    pub total_value: Option<Decimal>,
    #[serde(rename = "ativo", default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(rename = "formaPagamento", default)]
    pub payment_method: Option<String>,
    #[serde(rename = "observacao", default)]
    pub notes: Option<String>,
    /// Date or timestamp string; missing on legacy rows.
    #[serde(rename = "dataCompra", default)]
    pub purchase_date: Option<String>,
    #[serde(rename = "cliente", default)]
    pub client: Option<RawCliente>,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "produtos", default, deserialize_with = "null_as_default")]
    pub products: Vec<RawOrderLine>,
    #[serde(rename = "servico", default)]
    pub service: Option<RawService>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCliente {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
}

/// Order status as stored by the backend. Passed through untouched on the view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStatus {
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub nome: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawOrderLine {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "quantidade", default)]
    pub quantity: Option<Decimal>,
    #[serde(rename = "preco", default)]
    pub price: Option<Decimal>,
}

/// Work-order payload of a service order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawService {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "codigo", default)]
    pub code: Option<String>,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "precoBase", default)]
    pub base_price: Option<Decimal>,
    #[serde(rename = "ativo", default, deserialize_with = "null_as_default")]
    pub active: bool,
    /// Last stage recorded by the backend. May be stale or manually set.
    #[serde(rename = "etapa", default)]
    pub stage: Option<RawEtapa>,
    #[serde(rename = "agendamentos", default, deserialize_with = "null_as_default")]
    pub appointments: Vec<RawAppointment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawEtapa {
    #[serde(default)]
    pub nome: Option<String>,
}

/// A scheduling event (`agendamento`) attached to a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawAppointment {
    #[serde(default)]
    pub id: Option<i64>,
    /// `"ORCAMENTO"` or `"SERVICO"`.
    #[serde(rename = "tipoAgendamento", default)]
    pub kind: Option<String>,
    #[serde(rename = "statusAgendamento", default)]
    pub status: Option<RawAppointmentStatus>,
    #[serde(rename = "dataAgendamento", default)]
    pub scheduled_for: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawAppointmentStatus {
    #[serde(default)]
    pub nome: Option<String>,
}

impl RawService {
    pub fn stage_name(&self) -> Option<&str> {
        self.stage.as_ref().and_then(|s| s.nome.as_deref())
    }
}

impl RawAppointment {
    pub fn status_name(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.nome.as_deref())
    }
}

/// Caller-supplied context for normalization.
///
/// The only ambient input the normalizer needs is "today", used when a row has
/// no usable purchase date. Pinning it makes `normalize` a pure function of
/// `(raw, ctx)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeContext {
    pub today: NaiveDate,
}

impl NormalizeContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Context pinned to the local calendar date.
    pub fn today() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Parses a `YYYY-MM-DD` reference date.
    pub fn from_date_str(date: &str) -> Result<Self, Error> {
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map(Self::new)
            .map_err(|e| Error::Parse {
                reason: format!("invalid reference date {date:?}: {e}"),
            })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn null_collections_and_flags_become_defaults() {
        let raw: RawOrder = serde_json::from_value(serde_json::json!({
            "id": 7,
            "tipoPedido": "serviço",
            "ativo": null,
            "produtos": null,
            "servico": { "nome": "Revisão", "agendamentos": null, "etapa": null }
        }))
        .unwrap();

        assert_eq!(raw.id, 7);
        assert!(!raw.active);
        assert!(raw.products.is_empty());
        let service = raw.service.unwrap();
        assert!(service.appointments.is_empty());
        assert_eq!(service.stage_name(), None);
    }

    #[test]
    fn empty_object_deserializes() {
        let raw: RawOrder = serde_json::from_str("{}").unwrap();
        assert_eq!(raw, RawOrder::default());
    }

    #[test]
    fn appointment_status_name_is_read_through() {
        let appt: RawAppointment = serde_json::from_value(serde_json::json!({
            "tipoAgendamento": "ORCAMENTO",
            "statusAgendamento": { "nome": "CONCLUÍDO" }
        }))
        .unwrap();
        assert_eq!(appt.kind.as_deref(), Some("ORCAMENTO"));
        assert_eq!(appt.status_name(), Some("CONCLUÍDO"));
    }

    #[test]
    fn reference_date_parses_or_reports() {
        let ctx = NormalizeContext::from_date_str("2024-03-09").unwrap();
        assert_eq!(ctx.today, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert!(matches!(
            NormalizeContext::from_date_str("09/03/2024"),
            Err(Error::Parse { .. })
        ));
    }
}
