//! BonusResolver tests: source composition, security attenuation, rig
//! eligibility, and skill scoping


use industry_calculator::bonus::BonusResolver;
use industry_calculator::logging;
use industry_calculator::models::{ActivityKind, CalculationRequest, RigEligibility};
use test_helpers::*;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn reaction_request() -> CalculationRequest {
    let mut request = bare_request(1);
    request.blueprint_id = REACTION_FORMULA;
    request.activity = ActivityKind::Reaction;
    request.facility.structure_type = REACTION_STRUCTURE;
    request.facility.system = NULL_SEC_SYSTEM;
    request
}

#[test]
fn identity_request_resolves_identity_multipliers() {
    logging::init_test();
    let store = fixture_store();
    let request = bare_request(1);

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();

    assert_close(multipliers.material, 1.0);
    assert_close(multipliers.time, 1.0);
}

#[test]
fn blueprint_me_te_are_percentage_reductions() {
    let store = fixture_store();
    let mut request = bare_request(1);
    request.material_efficiency = 10;
    request.time_efficiency = 20;

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();

    assert_close(multipliers.material, 0.90);
    assert_close(multipliers.time, 0.80);
}

#[test]
fn structure_bonus_applies_on_both_axes() {
    let store = fixture_store();
    let mut request = bare_request(1);
    request.facility.structure_type = STRUCTURE;

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();

    assert_close(multipliers.material, 0.99);
    assert_close(multipliers.time, 0.85);
}

#[test]
fn rig_bonus_scales_with_security_class() {
    let store = fixture_store();

    // 2% raw, coefficients 1.0 / 1.9 / 2.1.
    for (system, expected) in [
        (HIGH_SEC_SYSTEM, 1.0 - 2.0 / 100.0),
        (LOW_SEC_SYSTEM, 1.0 - 2.0 * 1.9 / 100.0),
        (NULL_SEC_SYSTEM, 1.0 - 2.0 * 2.1 / 100.0),
    ] {
        let mut request = bare_request(1);
        request.facility.rigs = vec![ME_RIG];
        request.facility.system = system;

        let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();
        assert_close(multipliers.material, expected);
        assert_close(multipliers.time, 1.0);
    }
}

#[test]
fn unknown_security_defaults_to_high_sec_coefficient() {
    let store = fixture_store();
    let mut request = bare_request(1);
    request.facility.rigs = vec![ME_RIG];
    request.facility.system = 999_999;

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();
    assert_close(multipliers.material, 0.98);
}

#[test]
fn ineligible_rig_contributes_identity() {
    let mut store = fixture_store();
    // Restrict the rig to a category/group the Rifter does not match.
    store.eligibility.insert(
        ME_RIG,
        vec![RigEligibility {
            category: Some(4),
            group: Some(999),
        }],
    );

    let mut request = bare_request(1);
    request.facility.rigs = vec![ME_RIG];

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();
    assert_close(multipliers.material, 1.0);
    assert_close(multipliers.time, 1.0);
}

#[test]
fn rig_without_eligibility_records_fits_everything() {
    let mut store = fixture_store();
    store.eligibility.remove(&ME_RIG);

    let mut request = bare_request(1);
    request.facility.rigs = vec![ME_RIG];

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();
    assert_close(multipliers.material, 0.98);
}

#[test]
fn restricted_rig_without_resolvable_product_is_ineligible() {
    let mut store = fixture_store();
    store.products.remove(&BLUEPRINT);

    let mut request = bare_request(1);
    request.facility.rigs = vec![ME_RIG];

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();
    assert_close(multipliers.material, 1.0);
}

#[test]
fn rig_missing_attribute_row_contributes_identity() {
    let mut store = fixture_store();
    store.rigs.remove(&(ME_RIG, ActivityKind::Manufacturing));

    let mut request = bare_request(1);
    request.facility.rigs = vec![ME_RIG];

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();
    assert_close(multipliers.material, 1.0);
    assert_close(multipliers.time, 1.0);
}

#[test]
fn multiple_rigs_compose_multiplicatively() {
    let store = fixture_store();
    let mut request = bare_request(1);
    request.facility.rigs = vec![ME_RIG, TE_RIG];
    request.facility.system = LOW_SEC_SYSTEM;

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();
    assert_close(multipliers.material, 1.0 - 2.0 * 1.9 / 100.0);
    assert_close(multipliers.time, 1.0 - 20.0 * 1.9 / 100.0);
}

#[test]
fn skill_bonuses_apply_to_time_only() {
    let store = fixture_store();
    let mut request = bare_request(1);
    request.skills.insert(INDUSTRY, 5);
    request.skills.insert(ADVANCED_INDUSTRY, 5);
    request.skills.insert(CONSTRUCTION_SKILL, 4);

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();

    // -4%/level x5, -3%/level x5, -1%/level x4.
    let expected = (1.0 - 0.20) * (1.0 - 0.15) * (1.0 - 0.04);
    assert_close(multipliers.time, expected);
    assert_close(multipliers.material, 1.0);
}

#[test]
fn untrained_skills_contribute_identity() {
    let store = fixture_store();
    let request = bare_request(1);

    // Required skills exist but none are trained.
    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();
    assert_close(multipliers.time, 1.0);
}

#[test]
fn universal_skills_never_apply_to_reactions() {
    let store = fixture_store();
    let mut request = reaction_request();
    request.facility.structure_type = 0;
    request.skills.insert(INDUSTRY, 5);
    request.skills.insert(ADVANCED_INDUSTRY, 5);
    request.skills.insert(REACTIONS_SKILL, 5);

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();

    // Only the reaction skill counts: -4%/level x5.
    assert_close(multipliers.time, 0.80);
}

#[test]
fn reaction_structure_has_no_material_bonus() {
    let store = fixture_store();
    let request = reaction_request();

    // The fixture's refinery row carries a 5% material percentage, which
    // must be ignored; its 25% time bonus still applies.
    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();
    assert_close(multipliers.material, 1.0);
    assert_close(multipliers.time, 0.75);
}

#[test]
fn composition_is_order_independent() {
    let store = fixture_store();
    let mut request = bare_request(1);
    request.facility.structure_type = STRUCTURE;
    request.facility.rigs = vec![ME_RIG, TE_RIG];
    request.facility.system = LOW_SEC_SYSTEM;
    request.material_efficiency = 10;
    request.time_efficiency = 20;
    request.skills.insert(INDUSTRY, 5);
    request.skills.insert(ADVANCED_INDUSTRY, 5);
    request.skills.insert(CONSTRUCTION_SKILL, 4);

    let multipliers = BonusResolver::new(&store).resolve(&request).unwrap();

    let structure_m = 0.99;
    let rig_m = 1.0 - 2.0 * 1.9 / 100.0;
    let blueprint_m = 0.90;
    let structure_t = 0.85;
    let rig_t = 1.0 - 20.0 * 1.9 / 100.0;
    let blueprint_t = 0.80;
    let skill_t = (1.0 - 0.20) * (1.0 - 0.15) * (1.0 - 0.04);

    // Same factors multiplied in two different orders.
    let forward_m: f64 = structure_m * rig_m * blueprint_m;
    let reverse_m: f64 = blueprint_m * rig_m * structure_m;
    let forward_t: f64 = structure_t * rig_t * blueprint_t * skill_t;
    let reverse_t: f64 = skill_t * blueprint_t * rig_t * structure_t;

    assert!((forward_m - reverse_m).abs() < 1e-12);
    assert!((forward_t - reverse_t).abs() < 1e-12);
    assert_close(multipliers.material, forward_m);
    assert_close(multipliers.time, forward_t);
}
