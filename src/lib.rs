#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod appointments;
pub mod error;
pub mod filter;
pub mod lifecycle;
pub mod normalize;
pub mod stats;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use appointments::{AppointmentKind, AppointmentStatus, AppointmentSummary};
pub use error::Error;
pub use filter::{FilterSpec, FilterValue, filter};
pub use lifecycle::mapping::{OrderStatus, normalize_status, status_color};
pub use lifecycle::{LifecycleEngine, Progress, Stage, StageResolution, TOTAL_STAGES};
pub use normalize::{OrderType, OrderView, normalize, normalize_all, normalize_json};
pub use stats::{OrderStats, StageCount};
pub use types::{
    NormalizeContext, RawAppointment, RawAppointmentStatus, RawCliente, RawEtapa, RawOrder,
    RawOrderLine, RawService, RawStatus,
};

/// Convenience alias for `LifecycleEngine::resolve_stage`.
pub fn resolve_stage(service: &RawService) -> StageResolution {
    LifecycleEngine::resolve_stage(service)
}
