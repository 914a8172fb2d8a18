//! EIV and facility job-cost estimation
//!
//! The estimated item value is a tax basis, not a materials-cost total: it
//! always values one run's base quantities, before any efficiency. Actual
//! material spend is a separate concern computed from final quantities at
//! retail prices, outside this module.

use anyhow::Result;
use tracing::{debug, warn};

use crate::models::{ActivityKind, BaseMaterial, CalculationRequest, SystemId, TypeId};
use crate::store::{AttributeStore, PriceSource};

/// Fixed SCC surcharge applied to every job, independent of the facility.
pub const SCC_SURCHARGE_RATE: f64 = 0.04;

/// Cost index used when a system has no published index for the activity.
pub const DEFAULT_COST_INDEX: f64 = 0.05;

/// Cost figures for one calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    /// Single-run EIV of the base materials.
    pub estimated_item_value: f64,
    pub cost_index: f64,
    /// Run-scaled facility job cost (coefficient tax + building/SCC tax).
    pub facility_cost: f64,
    /// Single-run EIV plus run-scaled facility cost. The asymmetry is
    /// intentional: EIV serves only as the tax basis.
    pub total_cost: f64,
}

/// Compute EIV, facility cost, and total cost for a request.
///
/// Price failures degrade to zero prices and a missing cost index falls
/// back to [`DEFAULT_COST_INDEX`]; neither aborts the calculation.
pub async fn estimate<S: AttributeStore, P: PriceSource>(
    store: &S,
    prices: &P,
    request: &CalculationRequest,
    materials: &[BaseMaterial],
) -> Result<CostEstimate> {
    let eiv = estimated_item_value(prices, materials).await;
    let cost_index = cost_index(store, request.facility.system, request.activity)?;
    let tax_multiplier = store
        .structure_attributes(request.facility.structure_type, request.activity)?
        .map(|attrs| attrs.tax_multiplier)
        .unwrap_or(1.0);

    let coefficient_tax = eiv * cost_index * tax_multiplier;
    let building_and_scc_tax = eiv * (SCC_SURCHARGE_RATE + request.facility.tax_rate);
    let facility_cost_per_run = coefficient_tax + building_and_scc_tax;
    let facility_cost = facility_cost_per_run * f64::from(request.runs);

    debug!(
        eiv,
        cost_index,
        tax_multiplier,
        coefficient_tax,
        building_and_scc_tax,
        facility_cost,
        "estimated job cost"
    );

    Ok(CostEstimate {
        estimated_item_value: eiv,
        cost_index,
        facility_cost,
        total_cost: eiv + facility_cost,
    })
}

/// Sum of `adjusted_price * base_quantity_per_run` over the base material
/// list. Materials with no published price contribute zero.
async fn estimated_item_value<P: PriceSource>(prices: &P, materials: &[BaseMaterial]) -> f64 {
    let type_ids: Vec<TypeId> = materials.iter().map(|m| m.type_id).collect();
    let price_map = match prices.adjusted_prices(&type_ids).await {
        Ok(map) => map,
        Err(e) => {
            warn!("price lookup failed, valuing all materials at 0: {e}");
            Default::default()
        }
    };
    materials
        .iter()
        .map(|m| {
            let price = price_map.get(&m.type_id).copied().unwrap_or(0.0);
            price * m.quantity_per_run as f64
        })
        .sum()
}

fn cost_index<S: AttributeStore>(
    store: &S,
    system: SystemId,
    activity: ActivityKind,
) -> Result<f64> {
    match store.system_cost_index(system, activity)? {
        Some(index) => Ok(index),
        None => {
            debug!(system, %activity, "no cost index, using default");
            Ok(DEFAULT_COST_INDEX)
        }
    }
}
