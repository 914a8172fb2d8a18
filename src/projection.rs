//! Material and time projection
//!
//! Applies resolved multipliers and the run count to a blueprint's base
//! data. Quantities get one ceiling over the whole aggregate, not per run;
//! time keeps its fractional seconds.

use anyhow::Result;

use crate::models::{BaseMaterial, MaterialLine};
use crate::store::AttributeStore;

/// Final quantity for one material line.
///
/// A base quantity of 1 is exempt from efficiency and scales by run count
/// alone; everything else takes `ceil(base * multiplier * runs)`.
pub fn project_quantity(base_quantity: i64, material_multiplier: f64, runs: u32) -> i64 {
    if base_quantity == 1 {
        return i64::from(runs);
    }
    (base_quantity as f64 * material_multiplier * f64::from(runs)).ceil() as i64
}

/// Total production time in seconds. Not rounded; display formatting is the
/// consumer's concern.
pub fn project_time(base_seconds_per_run: f64, time_multiplier: f64, runs: u32) -> f64 {
    base_seconds_per_run * time_multiplier * f64::from(runs)
}

/// Project every base material into a final [`MaterialLine`], resolving
/// display names and icons from the store. A type with no metadata row
/// still projects, with a placeholder name.
pub fn project_materials<S: AttributeStore>(
    store: &S,
    materials: &[BaseMaterial],
    material_multiplier: f64,
    runs: u32,
) -> Result<Vec<MaterialLine>> {
    let mut lines = Vec::with_capacity(materials.len());
    for material in materials {
        let info = store.type_info(material.type_id)?;
        let (name, icon_id) = match info {
            Some(info) => (info.name, info.icon_id),
            None => (format!("Type {}", material.type_id), None),
        };
        lines.push(MaterialLine {
            type_id: material.type_id,
            name,
            icon_id,
            base_quantity: material.quantity_per_run,
            final_quantity: project_quantity(material.quantity_per_run, material_multiplier, runs),
            unscalable: material.quantity_per_run == 1,
        });
    }
    Ok(lines)
}
