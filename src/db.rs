//! SQLite reference database: schema, insert helpers, and the
//! [`AttributeStore`] adapter
//!
//! The database holds static game data (types, blueprint recipes, structure
//! and rig attributes, system securities, cost indices) plus a snapshot of
//! adjusted market prices. The calculator never touches SQL directly; it
//! sees this data only through [`SqliteStore`].

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use crate::models::{
    ActivityKind, BaseMaterial, Product, RigAttributes, RigEligibility, SecurityModifiers,
    SkillBonusScope, StructureAttributes, SystemId, TypeId, TypeInfo,
};
use crate::store::AttributeStore;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Type metadata (names, grouping, icons)
        CREATE TABLE IF NOT EXISTS types (
            type_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            group_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            icon_id INTEGER
        );

        -- Blueprint base materials (per run, pre-efficiency)
        CREATE TABLE IF NOT EXISTS blueprint_materials (
            blueprint_id INTEGER,
            material_type_id INTEGER,
            quantity_per_run INTEGER NOT NULL,
            PRIMARY KEY (blueprint_id, material_type_id)
        );

        -- Blueprint products
        CREATE TABLE IF NOT EXISTS blueprint_products (
            blueprint_id INTEGER PRIMARY KEY,
            product_type_id INTEGER NOT NULL,
            quantity_per_run INTEGER NOT NULL
        );

        -- Blueprint base production time
        CREATE TABLE IF NOT EXISTS blueprint_times (
            blueprint_id INTEGER PRIMARY KEY,
            seconds_per_run REAL NOT NULL
        );

        -- Skills a blueprint requires
        CREATE TABLE IF NOT EXISTS blueprint_skills (
            blueprint_id INTEGER,
            skill_type_id INTEGER,
            PRIMARY KEY (blueprint_id, skill_type_id)
        );

        -- Structure efficiency attributes, one row per activity
        CREATE TABLE IF NOT EXISTS structure_bonuses (
            structure_type_id INTEGER,
            activity TEXT,
            material_pct REAL NOT NULL,
            time_pct REAL NOT NULL,
            tax_multiplier REAL NOT NULL,
            high_sec_mod REAL NOT NULL,
            low_sec_mod REAL NOT NULL,
            null_sec_mod REAL NOT NULL,
            PRIMARY KEY (structure_type_id, activity)
        );

        -- Rig efficiency attributes, one row per activity
        CREATE TABLE IF NOT EXISTS rig_bonuses (
            rig_type_id INTEGER,
            activity TEXT,
            material_pct REAL NOT NULL,
            time_pct REAL NOT NULL,
            high_sec_mod REAL NOT NULL,
            low_sec_mod REAL NOT NULL,
            null_sec_mod REAL NOT NULL,
            PRIMARY KEY (rig_type_id, activity)
        );

        -- Rig product eligibility; no rows for a rig = eligible for all
        CREATE TABLE IF NOT EXISTS rig_eligibility (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            rig_type_id INTEGER NOT NULL,
            category_id INTEGER,
            group_id INTEGER
        );

        -- Per-level skill time bonuses, keyed by scope
        CREATE TABLE IF NOT EXISTS skill_bonuses (
            skill_type_id INTEGER,
            scope TEXT,
            time_pct_per_level REAL NOT NULL,
            PRIMARY KEY (skill_type_id, scope)
        );

        -- Solar systems and true security
        CREATE TABLE IF NOT EXISTS systems (
            system_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            true_security REAL NOT NULL
        );

        -- Per-activity industry cost indices
        CREATE TABLE IF NOT EXISTS cost_indices (
            system_id INTEGER,
            activity TEXT,
            cost_index REAL NOT NULL,
            PRIMARY KEY (system_id, activity)
        );

        -- Adjusted market price snapshot
        CREATE TABLE IF NOT EXISTS market_prices (
            type_id INTEGER PRIMARY KEY,
            adjusted_price REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_blueprint_materials_bp ON blueprint_materials(blueprint_id);
        CREATE INDEX IF NOT EXISTS idx_rig_eligibility_rig ON rig_eligibility(rig_type_id);
        "#,
    )?;
    Ok(())
}

fn activity_key(activity: ActivityKind) -> &'static str {
    match activity {
        ActivityKind::Manufacturing => "manufacturing",
        ActivityKind::Reaction => "reaction",
    }
}

fn scope_key(scope: SkillBonusScope) -> &'static str {
    match scope {
        SkillBonusScope::Universal => "universal",
        SkillBonusScope::Manufacturing => "manufacturing",
        SkillBonusScope::Reaction => "reaction",
    }
}

/// Insert or replace a type's metadata
pub fn upsert_type(conn: &Connection, info: &TypeInfo) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO types (type_id, name, group_id, category_id, icon_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            info.type_id,
            &info.name,
            info.group_id,
            info.category_id,
            info.icon_id,
        ),
    )?;
    Ok(())
}

/// Insert one base material line of a blueprint
pub fn insert_blueprint_material(
    conn: &Connection,
    blueprint_id: TypeId,
    material: &BaseMaterial,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO blueprint_materials (blueprint_id, material_type_id, quantity_per_run)
         VALUES (?1, ?2, ?3)",
        (blueprint_id, material.type_id, material.quantity_per_run),
    )?;
    Ok(())
}

/// Insert a blueprint's product and base time
pub fn upsert_blueprint(
    conn: &Connection,
    blueprint_id: TypeId,
    product: &Product,
    seconds_per_run: f64,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO blueprint_products (blueprint_id, product_type_id, quantity_per_run)
         VALUES (?1, ?2, ?3)",
        (blueprint_id, product.type_id, product.quantity_per_run),
    )?;
    conn.execute(
        "INSERT OR REPLACE INTO blueprint_times (blueprint_id, seconds_per_run)
         VALUES (?1, ?2)",
        (blueprint_id, seconds_per_run),
    )?;
    Ok(())
}

/// Record a skill requirement of a blueprint
pub fn insert_blueprint_skill(
    conn: &Connection,
    blueprint_id: TypeId,
    skill_type_id: TypeId,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO blueprint_skills (blueprint_id, skill_type_id) VALUES (?1, ?2)",
        (blueprint_id, skill_type_id),
    )?;
    Ok(())
}

/// Insert or replace a structure's bonus row for one activity
pub fn upsert_structure_bonus(
    conn: &Connection,
    structure_type_id: TypeId,
    activity: ActivityKind,
    attrs: &StructureAttributes,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO structure_bonuses
         (structure_type_id, activity, material_pct, time_pct, tax_multiplier, high_sec_mod, low_sec_mod, null_sec_mod)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            structure_type_id,
            activity_key(activity),
            attrs.material_pct,
            attrs.time_pct,
            attrs.tax_multiplier,
            attrs.security.high_sec,
            attrs.security.low_sec,
            attrs.security.null_sec,
        ),
    )?;
    Ok(())
}

/// Insert or replace a rig's bonus row for one activity
pub fn upsert_rig_bonus(
    conn: &Connection,
    rig_type_id: TypeId,
    activity: ActivityKind,
    attrs: &RigAttributes,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO rig_bonuses
         (rig_type_id, activity, material_pct, time_pct, high_sec_mod, low_sec_mod, null_sec_mod)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            rig_type_id,
            activity_key(activity),
            attrs.material_pct,
            attrs.time_pct,
            attrs.security.high_sec,
            attrs.security.low_sec,
            attrs.security.null_sec,
        ),
    )?;
    Ok(())
}

/// Add an eligibility restriction to a rig
pub fn insert_rig_eligibility(
    conn: &Connection,
    rig_type_id: TypeId,
    eligibility: &RigEligibility,
) -> Result<()> {
    conn.execute(
        "INSERT INTO rig_eligibility (rig_type_id, category_id, group_id) VALUES (?1, ?2, ?3)",
        (rig_type_id, eligibility.category, eligibility.group),
    )?;
    Ok(())
}

/// Insert or replace a skill's per-level time bonus for one scope
pub fn upsert_skill_bonus(
    conn: &Connection,
    skill_type_id: TypeId,
    scope: SkillBonusScope,
    time_pct_per_level: f64,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO skill_bonuses (skill_type_id, scope, time_pct_per_level)
         VALUES (?1, ?2, ?3)",
        (skill_type_id, scope_key(scope), time_pct_per_level),
    )?;
    Ok(())
}

/// Insert or replace a solar system
pub fn upsert_system(
    conn: &Connection,
    system_id: SystemId,
    name: &str,
    true_security: f64,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO systems (system_id, name, true_security) VALUES (?1, ?2, ?3)",
        (system_id, name, true_security),
    )?;
    Ok(())
}

/// Insert or replace a system's cost index for one activity
pub fn upsert_cost_index(
    conn: &Connection,
    system_id: SystemId,
    activity: ActivityKind,
    cost_index: f64,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO cost_indices (system_id, activity, cost_index) VALUES (?1, ?2, ?3)",
        (system_id, activity_key(activity), cost_index),
    )?;
    Ok(())
}

/// Insert or replace an adjusted market price
pub fn upsert_price(conn: &Connection, type_id: TypeId, adjusted_price: f64) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO market_prices (type_id, adjusted_price) VALUES (?1, ?2)",
        (type_id, adjusted_price),
    )?;
    Ok(())
}

/// Load the full adjusted-price snapshot, for pre-fetching into a
/// [`crate::store::StaticPrices`]
pub fn all_prices(conn: &Connection) -> Result<HashMap<TypeId, f64>> {
    let mut stmt = conn.prepare("SELECT type_id, adjusted_price FROM market_prices")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

    let mut prices = HashMap::new();
    for row in rows {
        let (type_id, price): (TypeId, f64) = row?;
        prices.insert(type_id, price);
    }
    Ok(prices)
}

/// Summary row for the blueprint listing
#[derive(Debug, Clone)]
pub struct BlueprintSummary {
    pub blueprint_id: TypeId,
    pub blueprint_name: String,
    pub product_name: String,
    pub seconds_per_run: f64,
}

/// List all blueprints with base time data
pub fn list_blueprints(conn: &Connection) -> Result<Vec<BlueprintSummary>> {
    let mut stmt = conn.prepare(
        "SELECT bt.blueprint_id,
                COALESCE(t.name, 'Blueprint ' || bt.blueprint_id),
                COALESCE(pt.name, 'Type ' || bp.product_type_id),
                bt.seconds_per_run
         FROM blueprint_times bt
         LEFT JOIN types t ON t.type_id = bt.blueprint_id
         LEFT JOIN blueprint_products bp ON bp.blueprint_id = bt.blueprint_id
         LEFT JOIN types pt ON pt.type_id = bp.product_type_id
         ORDER BY 2",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(BlueprintSummary {
            blueprint_id: row.get(0)?,
            blueprint_name: row.get(1)?,
            product_name: row.get(2)?,
            seconds_per_run: row.get(3)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// [`AttributeStore`] adapter over a SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Wrap an existing connection (e.g. in-memory, for tests).
    pub fn new(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl AttributeStore for SqliteStore {
    fn structure_attributes(
        &self,
        structure_type: TypeId,
        activity: ActivityKind,
    ) -> Result<Option<StructureAttributes>> {
        let attrs = self
            .conn
            .query_row(
                "SELECT material_pct, time_pct, tax_multiplier, high_sec_mod, low_sec_mod, null_sec_mod
                 FROM structure_bonuses WHERE structure_type_id = ?1 AND activity = ?2",
                (structure_type, activity_key(activity)),
                |row| {
                    Ok(StructureAttributes {
                        material_pct: row.get(0)?,
                        time_pct: row.get(1)?,
                        tax_multiplier: row.get(2)?,
                        security: SecurityModifiers {
                            high_sec: row.get(3)?,
                            low_sec: row.get(4)?,
                            null_sec: row.get(5)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(attrs)
    }

    fn rig_attributes(
        &self,
        rig_type: TypeId,
        activity: ActivityKind,
    ) -> Result<Option<RigAttributes>> {
        let attrs = self
            .conn
            .query_row(
                "SELECT material_pct, time_pct, high_sec_mod, low_sec_mod, null_sec_mod
                 FROM rig_bonuses WHERE rig_type_id = ?1 AND activity = ?2",
                (rig_type, activity_key(activity)),
                |row| {
                    Ok(RigAttributes {
                        material_pct: row.get(0)?,
                        time_pct: row.get(1)?,
                        security: SecurityModifiers {
                            high_sec: row.get(2)?,
                            low_sec: row.get(3)?,
                            null_sec: row.get(4)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(attrs)
    }

    fn rig_eligibility(&self, rig_type: TypeId) -> Result<Vec<RigEligibility>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category_id, group_id FROM rig_eligibility WHERE rig_type_id = ?1")?;
        let rows = stmt.query_map([rig_type], |row| {
            Ok(RigEligibility {
                category: row.get(0)?,
                group: row.get(1)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn blueprint_required_skills(&self, blueprint_id: TypeId) -> Result<Vec<TypeId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT skill_type_id FROM blueprint_skills WHERE blueprint_id = ?1")?;
        let rows = stmt.query_map([blueprint_id], |row| row.get(0))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn skill_time_bonus(&self, skill_id: TypeId, scope: SkillBonusScope) -> Result<Option<f64>> {
        let bonus = self
            .conn
            .query_row(
                "SELECT time_pct_per_level FROM skill_bonuses
                 WHERE skill_type_id = ?1 AND scope = ?2",
                (skill_id, scope_key(scope)),
                |row| row.get(0),
            )
            .optional()?;
        Ok(bonus)
    }

    fn blueprint_materials(&self, blueprint_id: TypeId) -> Result<Vec<BaseMaterial>> {
        let mut stmt = self.conn.prepare(
            "SELECT material_type_id, quantity_per_run FROM blueprint_materials
             WHERE blueprint_id = ?1 ORDER BY material_type_id",
        )?;
        let rows = stmt.query_map([blueprint_id], |row| {
            Ok(BaseMaterial {
                type_id: row.get(0)?,
                quantity_per_run: row.get(1)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn blueprint_time(&self, blueprint_id: TypeId) -> Result<Option<f64>> {
        let time = self
            .conn
            .query_row(
                "SELECT seconds_per_run FROM blueprint_times WHERE blueprint_id = ?1",
                [blueprint_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(time)
    }

    fn blueprint_product(&self, blueprint_id: TypeId) -> Result<Option<Product>> {
        let product = self
            .conn
            .query_row(
                "SELECT product_type_id, quantity_per_run FROM blueprint_products
                 WHERE blueprint_id = ?1",
                [blueprint_id],
                |row| {
                    Ok(Product {
                        type_id: row.get(0)?,
                        quantity_per_run: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(product)
    }

    fn type_info(&self, type_id: TypeId) -> Result<Option<TypeInfo>> {
        let info = self
            .conn
            .query_row(
                "SELECT type_id, name, group_id, category_id, icon_id FROM types
                 WHERE type_id = ?1",
                [type_id],
                |row| {
                    Ok(TypeInfo {
                        type_id: row.get(0)?,
                        name: row.get(1)?,
                        group_id: row.get(2)?,
                        category_id: row.get(3)?,
                        icon_id: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    fn system_security(&self, system_id: SystemId) -> Result<Option<f64>> {
        let sec = self
            .conn
            .query_row(
                "SELECT true_security FROM systems WHERE system_id = ?1",
                [system_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(sec)
    }

    fn system_cost_index(
        &self,
        system_id: SystemId,
        activity: ActivityKind,
    ) -> Result<Option<f64>> {
        let index = self
            .conn
            .query_row(
                "SELECT cost_index FROM cost_indices WHERE system_id = ?1 AND activity = ?2",
                (system_id, activity_key(activity)),
                |row| row.get(0),
            )
            .optional()?;
        Ok(index)
    }
}
