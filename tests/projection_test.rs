//! ProjectionEngine tests: rounding rules, the unscalable exemption, and
//! run scaling


use industry_calculator::projection::{project_materials, project_quantity, project_time};
use test_helpers::*;

#[test]
fn scalable_quantity_takes_one_aggregate_ceiling() {
    // ceil(100 * 0.90 * 5) = 450
    assert_eq!(project_quantity(100, 0.90, 5), 450);
}

#[test]
fn base_quantity_of_one_ignores_the_multiplier() {
    for multiplier in [0.0, 0.5, 0.9, 1.0] {
        assert_eq!(project_quantity(1, multiplier, 5), 5);
    }
    assert_eq!(project_quantity(1, 0.9, 1), 1);
}

#[test]
fn ceiling_applies_to_the_aggregate_not_per_run() {
    // Per-run rounding would give ceil(2.7) * 7 = 21; the aggregate gives
    // ceil(18.9) = 19.
    assert_eq!(project_quantity(3, 0.9, 7), 19);
}

#[test]
fn zero_multiplier_yields_zero_for_scalable_materials() {
    assert_eq!(project_quantity(100, 0.0, 5), 0);
}

#[test]
fn identity_multiplier_single_run_reproduces_base() {
    assert_eq!(project_quantity(100, 1.0, 1), 100);
    assert_eq!(project_quantity(7, 1.0, 1), 7);
}

#[test]
fn quantities_are_never_negative() {
    for base in [1, 2, 100, 28_288] {
        for multiplier in [0.0, 0.42, 0.9, 1.0] {
            for runs in [1, 5, 1000] {
                assert!(project_quantity(base, multiplier, runs) >= 0);
            }
        }
    }
}

#[test]
fn time_keeps_fractional_seconds() {
    let time = project_time(100.0, 0.831, 3);
    assert!((time - 249.3).abs() < 1e-9);
}

#[test]
fn material_lines_carry_names_and_flags() {
    let store = fixture_store();
    let materials = store.materials.get(&BLUEPRINT).unwrap().clone();

    let lines = project_materials(&store, &materials, 0.90, 5).unwrap();

    assert_eq!(lines.len(), 2);
    let tritanium = lines.iter().find(|l| l.type_id == TRITANIUM).unwrap();
    assert_eq!(tritanium.name, "Tritanium");
    assert_eq!(tritanium.base_quantity, 100);
    assert_eq!(tritanium.final_quantity, 450);
    assert!(!tritanium.unscalable);

    let megacyte = lines.iter().find(|l| l.type_id == MEGACYTE).unwrap();
    assert_eq!(megacyte.base_quantity, 1);
    assert_eq!(megacyte.final_quantity, 5);
    assert!(megacyte.unscalable);
}

#[test]
fn unknown_type_gets_a_placeholder_name() {
    let mut store = fixture_store();
    store.types.remove(&TRITANIUM);
    let materials = store.materials.get(&BLUEPRINT).unwrap().clone();

    let lines = project_materials(&store, &materials, 1.0, 1).unwrap();
    let tritanium = lines.iter().find(|l| l.type_id == TRITANIUM).unwrap();
    assert_eq!(tritanium.name, format!("Type {}", TRITANIUM));
    assert_eq!(tritanium.icon_id, None);
}
