//! Blueprint calculation entry point
//!
//! One stateless pass per call: resolve bonuses, project materials and
//! time, estimate cost. Requests are independent; calculations for
//! different blueprints may run concurrently against the same store.

use tracing::instrument;

use crate::bonus::BonusResolver;
use crate::cost;
use crate::error::CalcError;
use crate::models::{BlueprintSpec, CalculationRequest, CalculationResult, ProductLine, TypeId};
use crate::projection;
use crate::store::{AttributeStore, PriceSource};

/// The calculation engine, generic over its injected attribute store.
pub struct Calculator<S> {
    store: S,
}

impl<S: AttributeStore> Calculator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one calculation.
    ///
    /// Terminal failures are a blueprint with no base material data or no
    /// base time; everything else degrades to documented neutral defaults
    /// inside the resolver and estimator.
    #[instrument(skip(self, prices), fields(blueprint = request.blueprint_id, runs = request.runs))]
    pub async fn calculate<P: PriceSource>(
        &self,
        request: &CalculationRequest,
        prices: &P,
    ) -> Result<CalculationResult, CalcError> {
        if request.runs == 0 {
            return Err(CalcError::InvalidRuns);
        }

        let blueprint = self.load_blueprint(request.blueprint_id)?;

        let multipliers = BonusResolver::new(&self.store).resolve(request)?;

        let material_lines = projection::project_materials(
            &self.store,
            &blueprint.materials,
            multipliers.material,
            request.runs,
        )?;
        let time_seconds =
            projection::project_time(blueprint.time_per_run_s, multipliers.time, request.runs);

        let estimate = cost::estimate(&self.store, prices, request, &blueprint.materials).await?;

        let product = self.product_line(&blueprint, request.runs)?;

        Ok(CalculationResult {
            blueprint_id: request.blueprint_id,
            runs: request.runs,
            activity: request.activity,
            materials: material_lines,
            time_seconds,
            multipliers,
            estimated_item_value: estimate.estimated_item_value,
            cost_index: estimate.cost_index,
            facility_cost: estimate.facility_cost,
            total_cost: estimate.total_cost,
            product,
        })
    }

    /// Load a blueprint's base data once. No base materials or no base time
    /// makes the whole calculation impossible.
    fn load_blueprint(&self, blueprint_id: TypeId) -> Result<BlueprintSpec, CalcError> {
        let materials = self.store.blueprint_materials(blueprint_id)?;
        if materials.is_empty() {
            return Err(CalcError::MissingMaterials(blueprint_id));
        }
        let time_per_run_s = self
            .store
            .blueprint_time(blueprint_id)?
            .ok_or(CalcError::MissingTime(blueprint_id))?;
        let product = self.store.blueprint_product(blueprint_id)?;
        Ok(BlueprintSpec {
            blueprint_id,
            materials,
            time_per_run_s,
            product,
        })
    }

    fn product_line(
        &self,
        blueprint: &BlueprintSpec,
        runs: u32,
    ) -> Result<Option<ProductLine>, CalcError> {
        let Some(product) = blueprint.product else {
            return Ok(None);
        };
        let name = self
            .store
            .type_info(product.type_id)?
            .map(|info| info.name)
            .unwrap_or_else(|| format!("Type {}", product.type_id));
        Ok(Some(ProductLine {
            type_id: product.type_id,
            name,
            quantity_per_run: product.quantity_per_run,
            total_quantity: product.quantity_per_run * i64::from(runs),
        }))
    }
}
