//! Industry Calculator
//!
//! A manufacturing cost calculator for EVE Online blueprints.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use industry_calculator::db::{self, SqliteStore};
use industry_calculator::logging;
use industry_calculator::models::{
    ActivityKind, CalculationRequest, FacilityConfig, TypeId,
};
use industry_calculator::store::{AttributeStore, StaticPrices};
use industry_calculator::Calculator;

#[derive(Parser)]
#[command(name = "industry-calculator")]
#[command(about = "Manufacturing cost calculator for EVE Online blueprints")]
struct Cli {
    /// Path to the SQLite reference database
    #[arg(short, long, default_value = "industry_data.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Load sample data for testing (a small, realistic fixture set)
    LoadSample,

    /// Calculate materials, time, and cost for a blueprint
    Calc {
        /// Blueprint type ID
        blueprint: TypeId,

        /// Number of runs
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        runs: u32,

        /// Blueprint material efficiency level
        #[arg(long, default_value = "0")]
        me: u8,

        /// Blueprint time efficiency level
        #[arg(long, default_value = "0")]
        te: u8,

        /// Structure type ID the job is installed in
        #[arg(long, default_value = "0")]
        structure: TypeId,

        /// Installed rig type ID (repeatable)
        #[arg(long = "rig")]
        rigs: Vec<TypeId>,

        /// Solar system ID of the facility
        #[arg(long, default_value = "0")]
        system: i64,

        /// Facility tax rate as a fraction (0.01 = 1%)
        #[arg(long, default_value = "0.0")]
        tax: f64,

        /// Trained skill level as ID=LEVEL (repeatable, e.g. --skill 3380=5)
        #[arg(long = "skill")]
        skills: Vec<String>,

        /// Treat the blueprint as a reaction formula
        #[arg(long)]
        reaction: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all blueprints in the database
    ListBlueprints,

    /// Show base data for a specific blueprint
    Blueprint {
        /// Blueprint type ID
        id: TypeId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let store = SqliteStore::open(&cli.database)?;

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            load_sample_data(&store)?;
            println!("Sample data loaded successfully!");
        }

        Commands::Calc {
            blueprint,
            runs,
            me,
            te,
            structure,
            rigs,
            system,
            tax,
            skills,
            reaction,
            json,
        } => {
            let request = CalculationRequest {
                blueprint_id: blueprint,
                runs,
                material_efficiency: me,
                time_efficiency: te,
                facility: FacilityConfig {
                    structure_type: structure,
                    rigs,
                    tax_rate: tax,
                    system,
                },
                skills: parse_skills(&skills)?,
                activity: if reaction {
                    ActivityKind::Reaction
                } else {
                    ActivityKind::Manufacturing
                },
            };

            // Pre-fetch the price snapshot so the calculation path never
            // blocks on a lookup.
            let prices = StaticPrices(db::all_prices(store.conn())?);
            let calculator = Calculator::new(store);
            let result = calculator.calculate(&request, &prices).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result);
            }
        }

        Commands::ListBlueprints => {
            let blueprints = db::list_blueprints(store.conn())?;
            if blueprints.is_empty() {
                println!("No blueprints in database. Run 'load-sample' first.");
            } else {
                println!("{:<12} {:<32} {:<24}", "ID", "Blueprint", "Product");
                println!("{}", "-".repeat(68));
                for bp in blueprints {
                    println!(
                        "{:<12} {:<32} {:<24}",
                        bp.blueprint_id, bp.blueprint_name, bp.product_name
                    );
                }
            }
        }

        Commands::Blueprint { id } => {
            show_blueprint(&store, id)?;
        }
    }

    Ok(())
}

/// Parse repeated `--skill ID=LEVEL` arguments into a sparse level map
fn parse_skills(args: &[String]) -> Result<HashMap<TypeId, u8>> {
    let mut skills = HashMap::new();
    for arg in args {
        let (id, level) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid skill '{}', expected ID=LEVEL", arg))?;
        let id: TypeId = id
            .trim()
            .parse()
            .with_context(|| format!("invalid skill id in '{}'", arg))?;
        let level: u8 = level
            .trim()
            .parse()
            .with_context(|| format!("invalid skill level in '{}'", arg))?;
        if level > 5 {
            return Err(anyhow!("skill level {} out of range (0-5)", level));
        }
        skills.insert(id, level);
    }
    Ok(skills)
}

fn show_blueprint(store: &SqliteStore, id: TypeId) -> Result<()> {
    let Some(time) = store.blueprint_time(id)? else {
        println!("Blueprint '{}' not found", id);
        return Ok(());
    };

    let name = store
        .type_info(id)?
        .map(|t| t.name)
        .unwrap_or_else(|| format!("Blueprint {}", id));
    println!("Blueprint: {}", name);
    println!("  ID: {}", id);
    println!("  Base time: {:.0}s per run", time);

    if let Some(product) = store.blueprint_product(id)? {
        let product_name = store
            .type_info(product.type_id)?
            .map(|t| t.name)
            .unwrap_or_else(|| format!("Type {}", product.type_id));
        println!("  Product: {} x{}", product_name, product.quantity_per_run);
    }

    let materials = store.blueprint_materials(id)?;
    if !materials.is_empty() {
        println!("  Base materials (per run):");
        for m in materials {
            let material_name = store
                .type_info(m.type_id)?
                .map(|t| t.name)
                .unwrap_or_else(|| format!("Type {}", m.type_id));
            println!("    {} x{}", material_name, m.quantity_per_run);
        }
    }

    let skills = store.blueprint_required_skills(id)?;
    if !skills.is_empty() {
        println!("  Required skills:");
        for s in skills {
            let skill_name = store
                .type_info(s)?
                .map(|t| t.name)
                .unwrap_or_else(|| format!("Skill {}", s));
            println!("    {}", skill_name);
        }
    }

    Ok(())
}

/// Load a small, realistic fixture set: minerals, a frigate blueprint, an
/// engineering complex with manufacturing rigs, and a reaction formula.
fn load_sample_data(store: &SqliteStore) -> Result<()> {
    use industry_calculator::models::{
        BaseMaterial, Product, RigAttributes, RigEligibility, SecurityModifiers,
        SkillBonusScope, StructureAttributes, TypeInfo,
    };

    let conn = store.conn();

    // Minerals (category 4, group 18)
    let minerals: [(TypeId, &str, f64); 7] = [
        (34, "Tritanium", 4.12),
        (35, "Pyerite", 11.53),
        (36, "Mexallon", 74.06),
        (37, "Isogen", 125.30),
        (38, "Nocxium", 897.44),
        (39, "Zydrine", 1210.07),
        (40, "Megacyte", 640.22),
    ];
    for (type_id, name, price) in minerals {
        db::upsert_type(
            conn,
            &TypeInfo {
                type_id,
                name: name.to_string(),
                group_id: 18,
                category_id: 4,
                icon_id: Some(type_id),
            },
        )?;
        db::upsert_price(conn, type_id, price)?;
    }

    // Rifter (ship, category 6, group 25) and its blueprint
    db::upsert_type(
        conn,
        &TypeInfo {
            type_id: 587,
            name: "Rifter".to_string(),
            group_id: 25,
            category_id: 6,
            icon_id: Some(587),
        },
    )?;
    db::upsert_type(
        conn,
        &TypeInfo {
            type_id: 787,
            name: "Rifter Blueprint".to_string(),
            group_id: 105,
            category_id: 9,
            icon_id: Some(787),
        },
    )?;
    db::upsert_blueprint(
        conn,
        787,
        &Product {
            type_id: 587,
            quantity_per_run: 1,
        },
        6000.0,
    )?;
    let rifter_materials = [
        (34, 28_288),
        (35, 7_050),
        (36, 2_400),
        (37, 500),
        (38, 21),
        (39, 9),
        (40, 1),
    ];
    for (type_id, quantity_per_run) in rifter_materials {
        db::insert_blueprint_material(
            conn,
            787,
            &BaseMaterial {
                type_id,
                quantity_per_run,
            },
        )?;
    }
    db::insert_blueprint_skill(conn, 787, 3380)?;

    // Industry skills
    db::upsert_type(
        conn,
        &TypeInfo {
            type_id: 3380,
            name: "Industry".to_string(),
            group_id: 268,
            category_id: 16,
            icon_id: None,
        },
    )?;
    db::upsert_type(
        conn,
        &TypeInfo {
            type_id: 3388,
            name: "Advanced Industry".to_string(),
            group_id: 268,
            category_id: 16,
            icon_id: None,
        },
    )?;
    db::upsert_type(
        conn,
        &TypeInfo {
            type_id: 45746,
            name: "Reactions".to_string(),
            group_id: 268,
            category_id: 16,
            icon_id: None,
        },
    )?;
    db::upsert_skill_bonus(conn, 3380, SkillBonusScope::Universal, -4.0)?;
    db::upsert_skill_bonus(conn, 3388, SkillBonusScope::Universal, -3.0)?;
    db::upsert_skill_bonus(conn, 45746, SkillBonusScope::Reaction, -4.0)?;

    // Raitaru engineering complex: 1% ME, 15% TE, 3% job cost reduction
    db::upsert_type(
        conn,
        &TypeInfo {
            type_id: 35825,
            name: "Raitaru".to_string(),
            group_id: 1404,
            category_id: 65,
            icon_id: Some(35825),
        },
    )?;
    db::upsert_structure_bonus(
        conn,
        35825,
        ActivityKind::Manufacturing,
        &StructureAttributes {
            material_pct: 1.0,
            time_pct: 15.0,
            tax_multiplier: 0.97,
            security: SecurityModifiers::default(),
        },
    )?;

    // Standup M-Set ship manufacturing rigs, restricted to ships
    db::upsert_type(
        conn,
        &TypeInfo {
            type_id: 37156,
            name: "Standup M-Set Ship Manufacturing Efficiency I".to_string(),
            group_id: 1770,
            category_id: 66,
            icon_id: None,
        },
    )?;
    db::upsert_rig_bonus(
        conn,
        37156,
        ActivityKind::Manufacturing,
        &RigAttributes {
            material_pct: 2.0,
            time_pct: 0.0,
            security: SecurityModifiers {
                high_sec: 1.0,
                low_sec: 1.9,
                null_sec: 2.1,
            },
        },
    )?;
    db::insert_rig_eligibility(
        conn,
        37156,
        &RigEligibility {
            category: Some(6),
            group: None,
        },
    )?;

    db::upsert_type(
        conn,
        &TypeInfo {
            type_id: 37158,
            name: "Standup M-Set Ship Manufacturing Time Efficiency I".to_string(),
            group_id: 1770,
            category_id: 66,
            icon_id: None,
        },
    )?;
    db::upsert_rig_bonus(
        conn,
        37158,
        ActivityKind::Manufacturing,
        &RigAttributes {
            material_pct: 0.0,
            time_pct: 20.0,
            security: SecurityModifiers {
                high_sec: 1.0,
                low_sec: 1.9,
                null_sec: 2.1,
            },
        },
    )?;
    db::insert_rig_eligibility(
        conn,
        37158,
        &RigEligibility {
            category: Some(6),
            group: None,
        },
    )?;

    // Solar systems across the security bands
    db::upsert_system(conn, 30000142, "Jita", 0.9457)?;
    db::upsert_system(conn, 30002537, "Amamake", 0.4414)?;
    db::upsert_system(conn, 30004759, "1DQ1-A", -0.3872)?;
    db::upsert_cost_index(conn, 30000142, ActivityKind::Manufacturing, 0.0745)?;
    db::upsert_cost_index(conn, 30002537, ActivityKind::Manufacturing, 0.0112)?;
    db::upsert_cost_index(conn, 30004759, ActivityKind::Manufacturing, 0.0034)?;
    db::upsert_cost_index(conn, 30004759, ActivityKind::Reaction, 0.0021)?;

    println!("Loaded sample types, blueprint 787 (Rifter), structure, rigs, and systems");
    Ok(())
}
