//! End-to-end calculator tests: terminal errors, cost formulas, and the
//! full bonus stack


use industry_calculator::cost::{DEFAULT_COST_INDEX, SCC_SURCHARGE_RATE};
use industry_calculator::logging;
use industry_calculator::models::ActivityKind;
use industry_calculator::{CalcError, Calculator};
use test_helpers::*;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

// Fixture EIV: 100 Tritanium @ 4.0 + 1 Megacyte @ 640.0, per run.
const FIXTURE_EIV: f64 = 1040.0;

#[tokio::test]
async fn identity_run_reproduces_base_blueprint() {
    logging::init_test();
    let calculator = Calculator::new(fixture_store());

    let result = calculator
        .calculate(&bare_request(1), &fixture_prices())
        .await
        .unwrap();

    let tritanium = result
        .materials
        .iter()
        .find(|l| l.type_id == TRITANIUM)
        .unwrap();
    assert_eq!(tritanium.final_quantity, 100);
    let megacyte = result
        .materials
        .iter()
        .find(|l| l.type_id == MEGACYTE)
        .unwrap();
    assert_eq!(megacyte.final_quantity, 1);
    assert_close(result.time_seconds, 6000.0);

    let product = result.product.unwrap();
    assert_eq!(product.type_id, PRODUCT);
    assert_eq!(product.name, "Rifter");
    assert_eq!(product.total_quantity, 1);
}

#[tokio::test]
async fn me_scales_materials_but_spares_unscalable_lines() {
    let calculator = Calculator::new(fixture_store());
    let mut request = bare_request(5);
    request.material_efficiency = 10;

    let result = calculator
        .calculate(&request, &fixture_prices())
        .await
        .unwrap();

    let tritanium = result
        .materials
        .iter()
        .find(|l| l.type_id == TRITANIUM)
        .unwrap();
    assert_eq!(tritanium.final_quantity, 450); // ceil(100 * 0.9 * 5)
    let megacyte = result
        .materials
        .iter()
        .find(|l| l.type_id == MEGACYTE)
        .unwrap();
    assert_eq!(megacyte.final_quantity, 5);
    assert!(megacyte.unscalable);

    assert_eq!(result.product.unwrap().total_quantity, 5);
}

#[tokio::test]
async fn higher_me_never_increases_a_material_quantity() {
    let calculator = Calculator::new(fixture_store());

    let mut previous = i64::MAX;
    for me in 0..=10 {
        let mut request = bare_request(7);
        request.material_efficiency = me;
        let result = calculator
            .calculate(&request, &fixture_prices())
            .await
            .unwrap();
        let quantity = result
            .materials
            .iter()
            .find(|l| l.type_id == TRITANIUM)
            .unwrap()
            .final_quantity;
        assert!(quantity <= previous, "ME {me} increased the quantity");
        previous = quantity;
    }
}

#[tokio::test]
async fn missing_materials_is_a_terminal_error() {
    let mut store = fixture_store();
    store.materials.remove(&BLUEPRINT);
    let calculator = Calculator::new(store);

    let err = calculator
        .calculate(&bare_request(1), &fixture_prices())
        .await
        .unwrap_err();
    assert!(matches!(err, CalcError::MissingMaterials(id) if id == BLUEPRINT));
}

#[tokio::test]
async fn missing_time_is_a_terminal_error() {
    let mut store = fixture_store();
    store.times.remove(&BLUEPRINT);
    let calculator = Calculator::new(store);

    let err = calculator
        .calculate(&bare_request(1), &fixture_prices())
        .await
        .unwrap_err();
    assert!(matches!(err, CalcError::MissingTime(id) if id == BLUEPRINT));
}

#[tokio::test]
async fn zero_runs_is_rejected() {
    let calculator = Calculator::new(fixture_store());

    let err = calculator
        .calculate(&bare_request(0), &fixture_prices())
        .await
        .unwrap_err();
    assert!(matches!(err, CalcError::InvalidRuns));
}

#[tokio::test]
async fn eiv_uses_base_quantities_regardless_of_runs_and_me() {
    let calculator = Calculator::new(fixture_store());

    let mut request = bare_request(1);
    request.material_efficiency = 10;
    let single = calculator
        .calculate(&request, &fixture_prices())
        .await
        .unwrap();

    request.runs = 2;
    let double = calculator
        .calculate(&request, &fixture_prices())
        .await
        .unwrap();

    assert_close(single.estimated_item_value, FIXTURE_EIV);
    assert_close(double.estimated_item_value, FIXTURE_EIV);
    assert_close(double.facility_cost, single.facility_cost * 2.0);
}

#[tokio::test]
async fn facility_cost_formula_with_structure_tax_bonus() {
    let calculator = Calculator::new(fixture_store());
    let mut request = bare_request(2);
    request.facility.structure_type = STRUCTURE;
    request.facility.tax_rate = 0.01;

    let result = calculator
        .calculate(&request, &fixture_prices())
        .await
        .unwrap();

    let cost_index = 0.0745;
    let coefficient_tax = FIXTURE_EIV * cost_index * 0.97;
    let building_and_scc = FIXTURE_EIV * (SCC_SURCHARGE_RATE + 0.01);
    let expected_facility = (coefficient_tax + building_and_scc) * 2.0;

    assert_close(result.cost_index, cost_index);
    assert_close(result.facility_cost, expected_facility);
    assert_close(result.total_cost, FIXTURE_EIV + expected_facility);
}

#[tokio::test]
async fn missing_prices_degrade_to_zero_value() {
    let calculator = Calculator::new(fixture_store());

    let result = calculator
        .calculate(&bare_request(3), &no_prices())
        .await
        .unwrap();

    assert_close(result.estimated_item_value, 0.0);
    assert_close(result.facility_cost, 0.0);
    assert_close(result.total_cost, 0.0);
    // Materials still project normally.
    assert_eq!(result.materials.len(), 2);
}

#[tokio::test]
async fn missing_cost_index_falls_back_to_the_default() {
    let calculator = Calculator::new(fixture_store());
    let mut request = bare_request(1);
    request.facility.system = LOW_SEC_SYSTEM; // no manufacturing index recorded

    let result = calculator
        .calculate(&request, &fixture_prices())
        .await
        .unwrap();

    assert_close(result.cost_index, DEFAULT_COST_INDEX);
}

#[tokio::test]
async fn full_bonus_stack_in_low_sec() {
    let calculator = Calculator::new(fixture_store());
    let mut request = bare_request(5);
    request.facility.structure_type = STRUCTURE;
    request.facility.rigs = vec![ME_RIG, TE_RIG];
    request.facility.system = LOW_SEC_SYSTEM;
    request.material_efficiency = 10;
    request.time_efficiency = 20;
    request.skills.insert(INDUSTRY, 5);
    request.skills.insert(ADVANCED_INDUSTRY, 5);
    request.skills.insert(CONSTRUCTION_SKILL, 4);

    let result = calculator
        .calculate(&request, &fixture_prices())
        .await
        .unwrap();

    let material_mult = 0.99 * (1.0 - 2.0 * 1.9 / 100.0) * 0.90;
    let skill_time = (1.0 - 0.20) * (1.0 - 0.15) * (1.0 - 0.04);
    let time_mult = 0.85 * (1.0 - 20.0 * 1.9 / 100.0) * 0.80 * skill_time;

    assert_close(result.multipliers.material, material_mult);
    assert_close(result.multipliers.time, time_mult);

    let tritanium = result
        .materials
        .iter()
        .find(|l| l.type_id == TRITANIUM)
        .unwrap();
    assert_eq!(
        tritanium.final_quantity,
        (100.0 * material_mult * 5.0).ceil() as i64
    );
    assert_close(result.time_seconds, 6000.0 * time_mult * 5.0);
}

#[tokio::test]
async fn reaction_end_to_end() {
    let calculator = Calculator::new(fixture_store());
    let mut request = bare_request(3);
    request.blueprint_id = REACTION_FORMULA;
    request.activity = ActivityKind::Reaction;
    request.facility.structure_type = REACTION_STRUCTURE;
    request.facility.system = NULL_SEC_SYSTEM;
    request.skills.insert(REACTIONS_SKILL, 5);
    request.skills.insert(INDUSTRY, 5); // must not apply

    let result = calculator
        .calculate(&request, &no_prices())
        .await
        .unwrap();

    // No structure material bonus for reactions; inputs scale by runs only.
    let input = result
        .materials
        .iter()
        .find(|l| l.type_id == REACTION_INPUT)
        .unwrap();
    assert_eq!(input.final_quantity, 300);

    // 25% structure time bonus and -4%/level x5 reaction skill.
    assert_close(result.time_seconds, 10_800.0 * 0.75 * 0.80 * 3.0);
    assert_close(result.cost_index, 0.0021);
    assert_eq!(result.product.unwrap().total_quantity, 600);
}

#[tokio::test]
async fn result_renders_and_serializes() {
    let calculator = Calculator::new(fixture_store());
    let result = calculator
        .calculate(&bare_request(2), &fixture_prices())
        .await
        .unwrap();

    let text = result.to_string();
    assert!(text.contains("Rifter"));
    assert!(text.contains("Tritanium"));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["runs"], 2);
    assert_eq!(json["materials"][0]["type_id"], TRITANIUM);
}
