use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::lifecycle::Stage;
use crate::normalize::OrderView;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: Stage,
    pub label: &'static str,
    pub count: usize,
}

/// Dashboard figures over a set of normalized views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: usize,
    pub active_orders: usize,
    pub product_orders: usize,
    pub service_orders: usize,
    pub total_value: Decimal,
    pub average_ticket: Decimal,
    pub by_status: BTreeMap<String, usize>,
    /// Every stage in lifecycle order, including those with a zero count.
    pub by_stage: Vec<StageCount>,
}

impl OrderStats {
    pub fn from_views(views: &[OrderView]) -> Self {
        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_stage: Vec<StageCount> = Stage::ALL
            .iter()
            .map(|&stage| StageCount {
                stage,
                label: stage.label(),
                count: 0,
            })
            .collect();
        let mut total_value = Decimal::ZERO;
        let mut active_orders = 0;
        let mut service_orders = 0;

        for view in views {
            total_value = saturating_add(total_value, view.total_value);
            if view.active {
                active_orders += 1;
            }
            if view.is_service() {
                service_orders += 1;
            }
            *by_status.entry(view.status.clone()).or_default() += 1;
            if let Some(stage) = view.stage
                && let Some(entry) = by_stage.iter_mut().find(|e| e.stage == stage)
            {
                entry.count += 1;
            }
        }

        let average_ticket = if views.is_empty() {
            Decimal::ZERO
        } else {
            total_value
                .checked_div(Decimal::from(views.len()))
                .map_or(Decimal::ZERO, |avg| avg.round_dp(2))
        };

        Self {
            total_orders: views.len(),
            active_orders,
            product_orders: views.len() - service_orders,
            service_orders,
            total_value,
            average_ticket,
            by_status,
            by_stage,
        }
    }

    pub fn stage_count(&self, stage: Stage) -> usize {
        self.by_stage
            .iter()
            .find(|e| e.stage == stage)
            .map_or(0, |e| e.count)
    }
}

/// Clamps to `Decimal::MAX`/`Decimal::MIN` instead of panicking on overflow.
fn saturating_add(acc: Decimal, value: Decimal) -> Decimal {
    acc.checked_add(value).unwrap_or_else(|| {
        tracing::warn!(%acc, %value, "order total overflowed, saturating");
        if value.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}
