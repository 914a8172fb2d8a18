//! Data models for blueprints, facilities, bonuses, and calculation results

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

pub type TypeId = i64;
pub type SystemId = i64;
pub type GroupId = i64;
pub type CategoryId = i64;

/// Industry activity a job runs under. Reactions use a disjoint set of
/// attribute rows and skill rules from manufacturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActivityKind {
    Manufacturing,
    Reaction,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Manufacturing => write!(f, "manufacturing"),
            ActivityKind::Reaction => write!(f, "reaction"),
        }
    }
}

/// Security band of a solar system, used to attenuate structure and rig
/// bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SecurityClass {
    HighSec,
    LowSec,
    NullSecOrWormhole,
}

impl SecurityClass {
    /// Classify a true security value using the published game convention:
    /// values from 0.45 up round to a displayed 0.5 and count as high sec,
    /// values at or below 0.0 are null sec (wormhole systems carry negative
    /// true security), everything in between is low sec.
    pub fn from_true_security(sec: f64) -> Self {
        if sec >= 0.45 {
            SecurityClass::HighSec
        } else if sec > 0.0 {
            SecurityClass::LowSec
        } else {
            SecurityClass::NullSecOrWormhole
        }
    }
}

/// Which attribute row a skill's per-level time bonus is recorded under.
///
/// The two universal industry skills use their own row regardless of the
/// activity; every other skill is keyed by manufacturing vs. reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillBonusScope {
    Universal,
    Manufacturing,
    Reaction,
}

/// A pair of multiplicative factors, one per bonus axis.
///
/// Composition is elementwise multiplication, so it is commutative and
/// associative; the order sources are combined in is not observable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BonusMultiplier {
    pub material: f64,
    pub time: f64,
}

impl BonusMultiplier {
    pub const IDENTITY: BonusMultiplier = BonusMultiplier {
        material: 1.0,
        time: 1.0,
    };

    pub fn new(material: f64, time: f64) -> Self {
        Self { material, time }
    }

    /// Elementwise product of two multipliers.
    pub fn combine(self, other: BonusMultiplier) -> BonusMultiplier {
        BonusMultiplier {
            material: self.material * other.material,
            time: self.time * other.time,
        }
    }
}

impl Default for BonusMultiplier {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-security-class coefficients that scale a structure or rig's raw
/// bonus percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecurityModifiers {
    pub high_sec: f64,
    pub low_sec: f64,
    pub null_sec: f64,
}

impl SecurityModifiers {
    pub fn coefficient(&self, class: SecurityClass) -> f64 {
        match class {
            SecurityClass::HighSec => self.high_sec,
            SecurityClass::LowSec => self.low_sec,
            SecurityClass::NullSecOrWormhole => self.null_sec,
        }
    }
}

impl Default for SecurityModifiers {
    fn default() -> Self {
        Self {
            high_sec: 1.0,
            low_sec: 1.0,
            null_sec: 1.0,
        }
    }
}

/// Efficiency attributes of a structure type for one activity.
///
/// Percentages are reductions ("8" means consume 8% less). Reactions have
/// no structure material bonus, so `material_pct` is 0 for reaction rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureAttributes {
    pub material_pct: f64,
    pub time_pct: f64,
    /// Straight multiplier on the cost-index tax term (e.g. 0.97).
    pub tax_multiplier: f64,
    pub security: SecurityModifiers,
}

/// Efficiency attributes of an installed rig for one activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigAttributes {
    pub material_pct: f64,
    pub time_pct: f64,
    pub security: SecurityModifiers,
}

/// One eligibility restriction for a rig. A rig with no records is
/// eligible for every product; a rig with records is eligible only if at
/// least one record matches the product's category/group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigEligibility {
    pub category: Option<CategoryId>,
    pub group: Option<GroupId>,
}

impl RigEligibility {
    pub fn matches(&self, category: CategoryId, group: GroupId) -> bool {
        self.category.map_or(true, |c| c == category) && self.group.map_or(true, |g| g == group)
    }
}

/// Display metadata for a game type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub type_id: TypeId,
    pub name: String,
    pub group_id: GroupId,
    pub category_id: CategoryId,
    pub icon_id: Option<i64>,
}

/// One base material requirement of a blueprint, per run, pre-efficiency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseMaterial {
    pub type_id: TypeId,
    pub quantity_per_run: i64,
}

/// The product a blueprint yields per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Product {
    pub type_id: TypeId,
    pub quantity_per_run: i64,
}

/// A blueprint's base data, loaded once per calculation.
#[derive(Debug, Clone)]
pub struct BlueprintSpec {
    pub blueprint_id: TypeId,
    pub materials: Vec<BaseMaterial>,
    pub time_per_run_s: f64,
    pub product: Option<Product>,
}

/// The production facility a job is installed in.
#[derive(Debug, Clone)]
pub struct FacilityConfig {
    pub structure_type: TypeId,
    pub rigs: Vec<TypeId>,
    /// Owner-configured tax as a fraction (0.01 = 1%).
    pub tax_rate: f64,
    pub system: SystemId,
}

/// Everything a single calculation needs. Run count must be at least 1.
#[derive(Debug, Clone)]
pub struct CalculationRequest {
    pub blueprint_id: TypeId,
    pub runs: u32,
    /// Blueprint material efficiency level (percent reduction).
    pub material_efficiency: u8,
    /// Blueprint time efficiency level (percent reduction).
    pub time_efficiency: u8,
    pub facility: FacilityConfig,
    /// Sparse map of trained skill levels, skill type id -> level.
    pub skills: HashMap<TypeId, u8>,
    pub activity: ActivityKind,
}

/// One final material requirement.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialLine {
    pub type_id: TypeId,
    pub name: String,
    pub icon_id: Option<i64>,
    /// Per-run quantity before any efficiency.
    pub base_quantity: i64,
    /// Quantity after efficiency and run scaling.
    pub final_quantity: i64,
    /// Base quantity of 1: exempt from efficiency, still scaled by runs.
    pub unscalable: bool,
}

/// Resolved product over all requested runs.
#[derive(Debug, Clone, Serialize)]
pub struct ProductLine {
    pub type_id: TypeId,
    pub name: String,
    pub quantity_per_run: i64,
    pub total_quantity: i64,
}

/// Output of one calculation. Constructed once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationResult {
    pub blueprint_id: TypeId,
    pub runs: u32,
    pub activity: ActivityKind,
    pub materials: Vec<MaterialLine>,
    /// Total production time in seconds, fractional part preserved.
    pub time_seconds: f64,
    pub multipliers: BonusMultiplier,
    /// Estimated item value of one run's base materials (tax basis only).
    pub estimated_item_value: f64,
    pub cost_index: f64,
    pub facility_cost: f64,
    /// Single-run EIV plus run-scaled facility cost.
    pub total_cost: f64,
    pub product: Option<ProductLine>,
}

impl fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== {} job: blueprint {} x{} runs ===",
            self.activity, self.blueprint_id, self.runs
        )?;
        if let Some(product) = &self.product {
            writeln!(f, "Product: {} x{}", product.name, product.total_quantity)?;
        }
        writeln!(f)?;

        writeln!(f, "{:<32} {:>12} {:>14}", "Material", "Base/run", "Total")?;
        writeln!(f, "{}", "-".repeat(60))?;
        for line in &self.materials {
            let marker = if line.unscalable { "*" } else { " " };
            writeln!(
                f,
                "{:<32} {:>12} {:>13}{}",
                line.name, line.base_quantity, line.final_quantity, marker
            )?;
        }
        if self.materials.iter().any(|l| l.unscalable) {
            writeln!(f, "(* exempt from material efficiency)")?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "Time: {} (multiplier {:.4})",
            format_duration(self.time_seconds),
            self.multipliers.time
        )?;
        writeln!(f, "Material multiplier: {:.4}", self.multipliers.material)?;
        writeln!(f)?;

        writeln!(f, "EIV (per run):  {:>16.2} ISK", self.estimated_item_value)?;
        writeln!(f, "Cost index:     {:>16.4}", self.cost_index)?;
        writeln!(f, "Facility cost:  {:>16.2} ISK", self.facility_cost)?;
        writeln!(f, "Total cost:     {:>16.2} ISK", self.total_cost)?;

        Ok(())
    }
}

/// Format a duration in seconds as "1d 2h 3m 4s", dropping leading zero
/// units. Sub-second remainders round to the nearest second for display.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || !parts.is_empty() {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || !parts.is_empty() {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", secs));
    parts.join(" ")
}
