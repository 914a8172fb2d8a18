//! Bonus resolution: structure, rig, blueprint, and skill multipliers
//!
//! Four independent sources each contribute a multiplicative factor per
//! axis. Structure and rig percentages are attenuated by the facility
//! system's security class before conversion; blueprint ME/TE and skills
//! are not. Missing attribute rows contribute the identity.

use anyhow::Result;
use tracing::debug;

use crate::models::{
    ActivityKind, BonusMultiplier, CalculationRequest, CategoryId, GroupId, SecurityClass,
    SkillBonusScope, SystemId, TypeId,
};
use crate::store::AttributeStore;

/// Industry: applies to every manufacturing job regardless of the
/// blueprint's own skill requirements.
pub const INDUSTRY_SKILL: TypeId = 3380;
/// Advanced Industry: the second universal manufacturing skill.
pub const ADVANCED_INDUSTRY_SKILL: TypeId = 3388;

/// Resolves the composed material/time multipliers for one request.
pub struct BonusResolver<'a, S> {
    store: &'a S,
}

impl<'a, S: AttributeStore> BonusResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Compose structure, rig, blueprint, and skill bonuses.
    ///
    /// Composition is commutative, so the order here is not observable in
    /// the result.
    pub fn resolve(&self, request: &CalculationRequest) -> Result<BonusMultiplier> {
        let security = self.security_class(request.facility.system)?;
        let product = self.product_category_group(request.blueprint_id)?;

        let structure = self.structure_bonus(
            request.facility.structure_type,
            request.activity,
            security,
        )?;
        let rigs = self.rig_bonus(&request.facility.rigs, request.activity, security, product)?;
        let blueprint = Self::blueprint_bonus(request);
        let skills = self.skill_time_multiplier(request)?;

        debug!(
            ?security,
            structure_material = structure.material,
            structure_time = structure.time,
            rig_material = rigs.material,
            rig_time = rigs.time,
            blueprint_material = blueprint.material,
            blueprint_time = blueprint.time,
            skill_time = skills,
            "resolved bonus sources"
        );

        let composed = structure
            .combine(rigs)
            .combine(blueprint)
            .combine(BonusMultiplier::new(1.0, skills));
        Ok(composed)
    }

    /// Security class of the facility's system. A system with no recorded
    /// security degrades to high sec, whose coefficient is conventionally
    /// the identity.
    fn security_class(&self, system: SystemId) -> Result<SecurityClass> {
        match self.store.system_security(system)? {
            Some(sec) => Ok(SecurityClass::from_true_security(sec)),
            None => {
                debug!(system, "no security record, assuming high sec");
                Ok(SecurityClass::HighSec)
            }
        }
    }

    /// Category and group of the blueprint's product, for rig eligibility.
    fn product_category_group(
        &self,
        blueprint_id: TypeId,
    ) -> Result<Option<(CategoryId, GroupId)>> {
        let Some(product) = self.store.blueprint_product(blueprint_id)? else {
            return Ok(None);
        };
        Ok(self
            .store
            .type_info(product.type_id)?
            .map(|info| (info.category_id, info.group_id)))
    }

    fn structure_bonus(
        &self,
        structure_type: TypeId,
        activity: ActivityKind,
        security: SecurityClass,
    ) -> Result<BonusMultiplier> {
        let Some(attrs) = self.store.structure_attributes(structure_type, activity)? else {
            return Ok(BonusMultiplier::IDENTITY);
        };
        let coefficient = attrs.security.coefficient(security);
        // Reactions get no structure material bonus, whatever the row says.
        let material_pct = match activity {
            ActivityKind::Manufacturing => attrs.material_pct,
            ActivityKind::Reaction => 0.0,
        };
        Ok(BonusMultiplier::new(
            reduction_multiplier(material_pct * coefficient),
            reduction_multiplier(attrs.time_pct * coefficient),
        ))
    }

    /// Composed bonus of all installed rigs that are eligible for the
    /// blueprint's product.
    fn rig_bonus(
        &self,
        rigs: &[TypeId],
        activity: ActivityKind,
        security: SecurityClass,
        product: Option<(CategoryId, GroupId)>,
    ) -> Result<BonusMultiplier> {
        let mut composed = BonusMultiplier::IDENTITY;
        for &rig in rigs {
            if !self.rig_is_eligible(rig, product)? {
                debug!(rig, "rig not eligible for product, skipping");
                continue;
            }
            let Some(attrs) = self.store.rig_attributes(rig, activity)? else {
                continue;
            };
            let coefficient = attrs.security.coefficient(security);
            let contribution = BonusMultiplier::new(
                reduction_multiplier(attrs.material_pct * coefficient),
                reduction_multiplier(attrs.time_pct * coefficient),
            );
            debug!(
                rig,
                material = contribution.material,
                time = contribution.time,
                "rig contribution"
            );
            composed = composed.combine(contribution);
        }
        Ok(composed)
    }

    /// A rig with no eligibility records fits every product. A rig with
    /// records needs at least one of them to match; if the product's
    /// category/group cannot be resolved, a restricted rig is treated as
    /// ineligible.
    fn rig_is_eligible(
        &self,
        rig: TypeId,
        product: Option<(CategoryId, GroupId)>,
    ) -> Result<bool> {
        let records = self.store.rig_eligibility(rig)?;
        if records.is_empty() {
            return Ok(true);
        }
        let Some((category, group)) = product else {
            return Ok(false);
        };
        Ok(records.iter().any(|r| r.matches(category, group)))
    }

    /// The blueprint's own ME/TE levels, never security scaled.
    fn blueprint_bonus(request: &CalculationRequest) -> BonusMultiplier {
        BonusMultiplier::new(
            reduction_multiplier(f64::from(request.material_efficiency)),
            reduction_multiplier(f64::from(request.time_efficiency)),
        )
    }

    /// Time-axis multiplier from character skills. Skills never affect the
    /// material axis.
    ///
    /// Relevant skills are the blueprint's required skills plus, for
    /// manufacturing only, the two universal industry skills. Untrained
    /// skills and skills with no bonus row contribute the identity.
    fn skill_time_multiplier(&self, request: &CalculationRequest) -> Result<f64> {
        let mut relevant = self.store.blueprint_required_skills(request.blueprint_id)?;
        if request.activity == ActivityKind::Manufacturing {
            for universal in [INDUSTRY_SKILL, ADVANCED_INDUSTRY_SKILL] {
                if !relevant.contains(&universal) {
                    relevant.push(universal);
                }
            }
        }
        relevant.sort_unstable();
        relevant.dedup();

        let mut multiplier = 1.0;
        for skill in relevant {
            let level = request.skills.get(&skill).copied().unwrap_or(0);
            if level == 0 {
                continue;
            }
            let scope = skill_scope(skill, request.activity);
            let Some(pct_per_level) = self.store.skill_time_bonus(skill, scope)? else {
                continue;
            };
            // Bonus percentages are negative, e.g. -4 per level.
            let factor = 1.0 + (pct_per_level * f64::from(level)) / 100.0;
            debug!(skill, level, pct_per_level, factor, "skill contribution");
            multiplier *= factor;
        }
        Ok(multiplier)
    }
}

/// Convert a percentage reduction into a multiplier: 8 -> 0.92.
fn reduction_multiplier(pct: f64) -> f64 {
    1.0 - pct / 100.0
}

/// The attribute scope a skill's time bonus is recorded under. The two
/// universal skills keep their own scope even when a blueprint also lists
/// them as requirements.
fn skill_scope(skill: TypeId, activity: ActivityKind) -> SkillBonusScope {
    if skill == INDUSTRY_SKILL || skill == ADVANCED_INDUSTRY_SKILL {
        SkillBonusScope::Universal
    } else {
        match activity {
            ActivityKind::Manufacturing => SkillBonusScope::Manufacturing,
            ActivityKind::Reaction => SkillBonusScope::Reaction,
        }
    }
}
