//! Calculator error types

use thiserror::Error;

use crate::models::TypeId;

/// Terminal calculation failures.
///
/// Missing attribute rows for structures, rigs, and skills degrade to
/// identity contributions and never appear here; missing prices degrade to
/// zero and a missing cost index falls back to a default. Only conditions
/// that make the whole calculation impossible are errors.
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("blueprint {0} has no base material data")]
    MissingMaterials(TypeId),

    #[error("blueprint {0} has no base production time")]
    MissingTime(TypeId),

    #[error("run count must be at least 1")]
    InvalidRuns,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
