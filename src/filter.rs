use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::lifecycle::Stage;
use crate::normalize::OrderView;

/// Value meaning "no restriction" for any filter key.
pub const ALL: &str = "Todos";

/// A filter key's value: one value or a set of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    fn restrictive(value: &str) -> bool {
        let value = value.trim();
        !value.is_empty() && value != ALL
    }

    /// Values that actually restrict, or `None` when the key is disabled.
    ///
    /// Empty strings and `"Todos"` disable the key; a list containing `"Todos"`
    /// disables it as well.
    pub fn terms(&self) -> Option<Vec<&str>> {
        let terms: Vec<&str> = match self {
            Self::One(v) => vec![v.as_str()],
            Self::Many(vs) => {
                if vs.iter().any(|v| v.trim() == ALL) {
                    return None;
                }
                vs.iter().map(String::as_str).collect()
            }
        };
        let terms: Vec<&str> = terms
            .into_iter()
            .filter(|t| Self::restrictive(t))
            .map(str::trim)
            .collect();
        (!terms.is_empty()).then_some(terms)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default)]
    pub status: Option<FilterValue>,
    #[serde(default)]
    pub payment_method: Option<FilterValue>,
    #[serde(default)]
    pub stage: Option<FilterValue>,
    #[serde(default)]
    pub search: Option<FilterValue>,
}

impl FilterSpec {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_status(mut self, value: impl Into<FilterValue>) -> Self {
        self.status = Some(value.into());
        self
    }

    pub fn with_payment_method(mut self, value: impl Into<FilterValue>) -> Self {
        self.payment_method = Some(value.into());
        self
    }

    pub fn with_stage(mut self, value: impl Into<FilterValue>) -> Self {
        self.stage = Some(value.into());
        self
    }

    pub fn with_search(mut self, value: impl Into<FilterValue>) -> Self {
        self.search = Some(value.into());
        self
    }

    fn compile(&self) -> CompiledFilter {
        let terms = |v: &Option<FilterValue>| {
            v.as_ref()
                .and_then(FilterValue::terms)
                .map(|ts| ts.into_iter().map(str::to_string).collect::<Vec<_>>())
        };
        CompiledFilter {
            status: terms(&self.status),
            payment_method: terms(&self.payment_method)
                .map(|ts| ts.into_iter().map(|t| t.to_lowercase()).collect()),
            stage: terms(&self.stage).map(|ts| stage_terms(&ts)),
            search: terms(&self.search)
                .map(|ts| ts.into_iter().map(|t| t.to_lowercase()).collect()),
        }
    }
}

/// Terms naming no stage are dropped. A filter made only of such terms
/// matches no view.
fn stage_terms(terms: &[String]) -> Vec<Stage> {
    terms
        .iter()
        .filter_map(|t| {
            let stage = Stage::parse_any(t);
            if stage.is_none() {
                tracing::debug!(term = %t, "stage filter term names no stage");
            }
            stage
        })
        .collect()
}

struct CompiledFilter {
    status: Option<Vec<String>>,
    payment_method: Option<Vec<String>>,
    stage: Option<Vec<Stage>>,
    search: Option<Vec<String>>,
}

impl CompiledFilter {
    fn matches(&self, view: &OrderView) -> bool {
        self.matches_status(view)
            && self.matches_payment_method(view)
            && self.matches_stage(view)
            && self.matches_search(view)
    }

    fn matches_status(&self, view: &OrderView) -> bool {
        let Some(terms) = &self.status else {
            return true;
        };
        let raw_name = view.raw_status.as_ref().and_then(|s| s.nome.as_deref());
        terms
            .iter()
            .any(|t| *t == view.status || Some(t.as_str()) == raw_name)
    }

    fn matches_payment_method(&self, view: &OrderView) -> bool {
        let Some(terms) = &self.payment_method else {
            return true;
        };
        let method = view.payment_method.trim().to_lowercase();
        terms.iter().any(|t| *t == method)
    }

    fn matches_stage(&self, view: &OrderView) -> bool {
        let Some(stages) = &self.stage else {
            return true;
        };
        view.stage.is_some_and(|stage| stages.contains(&stage))
    }

    fn matches_search(&self, view: &OrderView) -> bool {
        let Some(terms) = &self.search else {
            return true;
        };
        let haystack = search_haystack(view);
        terms.iter().any(|t| haystack.contains(t.as_str()))
    }
}

/// Lowercased text searched by the free-text filter.
pub fn search_haystack(view: &OrderView) -> String {
    format!(
        "{} {} {} {} {}",
        view.display_id,
        view.cliente_nome,
        view.items_description,
        view.description,
        view.payment_method
    )
    .to_lowercase()
}

/// Returns the views matching every active key of `spec`, in input order.
pub fn filter(views: &[OrderView], spec: &FilterSpec) -> Vec<OrderView> {
    let compiled = spec.compile();
    views
        .iter()
        .filter(|v| compiled.matches(v))
        .cloned()
        .collect()
}
