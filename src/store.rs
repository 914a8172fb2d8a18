//! Collaborator interfaces: attribute lookups and market prices
//!
//! The calculator performs no I/O of its own; everything it needs to know
//! about game entities comes through [`AttributeStore`], and market
//! valuations come through the async [`PriceSource`]. Both are injected, so
//! tests run against the in-memory implementations below with no database.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    ActivityKind, BaseMaterial, Product, RigAttributes, RigEligibility, SkillBonusScope,
    StructureAttributes, SystemId, TypeId, TypeInfo,
};

/// Read-only provider of per-entity numeric attributes.
///
/// `Ok(None)` / an empty vec means "no row recorded", which callers treat
/// as an identity contribution or a documented fallback. `Err` is reserved
/// for storage failures.
pub trait AttributeStore {
    fn structure_attributes(
        &self,
        structure_type: TypeId,
        activity: ActivityKind,
    ) -> Result<Option<StructureAttributes>>;

    fn rig_attributes(
        &self,
        rig_type: TypeId,
        activity: ActivityKind,
    ) -> Result<Option<RigAttributes>>;

    fn rig_eligibility(&self, rig_type: TypeId) -> Result<Vec<RigEligibility>>;

    fn blueprint_required_skills(&self, blueprint_id: TypeId) -> Result<Vec<TypeId>>;

    /// Per-level time bonus percentage for a skill (negative values reduce
    /// time), keyed by the scope its attribute row lives under.
    fn skill_time_bonus(&self, skill_id: TypeId, scope: SkillBonusScope) -> Result<Option<f64>>;

    fn blueprint_materials(&self, blueprint_id: TypeId) -> Result<Vec<BaseMaterial>>;

    /// Base production time per run, in seconds.
    fn blueprint_time(&self, blueprint_id: TypeId) -> Result<Option<f64>>;

    fn blueprint_product(&self, blueprint_id: TypeId) -> Result<Option<Product>>;

    fn type_info(&self, type_id: TypeId) -> Result<Option<TypeInfo>>;

    /// True security value of a solar system.
    fn system_security(&self, system_id: SystemId) -> Result<Option<f64>>;

    /// Per-activity industry cost index of a solar system, as a fraction.
    fn system_cost_index(&self, system_id: SystemId, activity: ActivityKind)
        -> Result<Option<f64>>;
}

/// Async source of current adjusted market prices.
#[async_trait]
pub trait PriceSource {
    /// Adjusted prices keyed by type id. Types without a published price
    /// may be omitted; callers treat absence as a price of zero.
    async fn adjusted_prices(&self, type_ids: &[TypeId]) -> Result<HashMap<TypeId, f64>>;
}

/// In-memory attribute store for tests and sample data.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub structures: HashMap<(TypeId, ActivityKind), StructureAttributes>,
    pub rigs: HashMap<(TypeId, ActivityKind), RigAttributes>,
    pub eligibility: HashMap<TypeId, Vec<RigEligibility>>,
    pub required_skills: HashMap<TypeId, Vec<TypeId>>,
    pub skill_bonuses: HashMap<(TypeId, SkillBonusScope), f64>,
    pub materials: HashMap<TypeId, Vec<BaseMaterial>>,
    pub times: HashMap<TypeId, f64>,
    pub products: HashMap<TypeId, Product>,
    pub types: HashMap<TypeId, TypeInfo>,
    pub securities: HashMap<SystemId, f64>,
    pub cost_indices: HashMap<(SystemId, ActivityKind), f64>,
}

impl AttributeStore for MemoryStore {
    fn structure_attributes(
        &self,
        structure_type: TypeId,
        activity: ActivityKind,
    ) -> Result<Option<StructureAttributes>> {
        Ok(self.structures.get(&(structure_type, activity)).copied())
    }

    fn rig_attributes(
        &self,
        rig_type: TypeId,
        activity: ActivityKind,
    ) -> Result<Option<RigAttributes>> {
        Ok(self.rigs.get(&(rig_type, activity)).copied())
    }

    fn rig_eligibility(&self, rig_type: TypeId) -> Result<Vec<RigEligibility>> {
        Ok(self.eligibility.get(&rig_type).cloned().unwrap_or_default())
    }

    fn blueprint_required_skills(&self, blueprint_id: TypeId) -> Result<Vec<TypeId>> {
        Ok(self
            .required_skills
            .get(&blueprint_id)
            .cloned()
            .unwrap_or_default())
    }

    fn skill_time_bonus(&self, skill_id: TypeId, scope: SkillBonusScope) -> Result<Option<f64>> {
        Ok(self.skill_bonuses.get(&(skill_id, scope)).copied())
    }

    fn blueprint_materials(&self, blueprint_id: TypeId) -> Result<Vec<BaseMaterial>> {
        Ok(self.materials.get(&blueprint_id).cloned().unwrap_or_default())
    }

    fn blueprint_time(&self, blueprint_id: TypeId) -> Result<Option<f64>> {
        Ok(self.times.get(&blueprint_id).copied())
    }

    fn blueprint_product(&self, blueprint_id: TypeId) -> Result<Option<Product>> {
        Ok(self.products.get(&blueprint_id).copied())
    }

    fn type_info(&self, type_id: TypeId) -> Result<Option<TypeInfo>> {
        Ok(self.types.get(&type_id).cloned())
    }

    fn system_security(&self, system_id: SystemId) -> Result<Option<f64>> {
        Ok(self.securities.get(&system_id).copied())
    }

    fn system_cost_index(
        &self,
        system_id: SystemId,
        activity: ActivityKind,
    ) -> Result<Option<f64>> {
        Ok(self.cost_indices.get(&(system_id, activity)).copied())
    }
}

/// A pre-fetched price map. Also what the CLI builds after loading prices
/// from the local database, keeping the calculation path free of blocking
/// lookups.
#[derive(Debug, Default, Clone)]
pub struct StaticPrices(pub HashMap<TypeId, f64>);

#[async_trait]
impl PriceSource for StaticPrices {
    async fn adjusted_prices(&self, type_ids: &[TypeId]) -> Result<HashMap<TypeId, f64>> {
        Ok(type_ids
            .iter()
            .filter_map(|id| self.0.get(id).map(|p| (*id, *p)))
            .collect())
    }
}
