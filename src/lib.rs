//! Manufacturing cost calculator for EVE Online blueprints
//!
//! Turns a blueprint, a production facility (structure + rigs), character
//! skills, and a run count into a final bill of materials, production time,
//! and job cost. The engine is a pure function of its inputs: all game data
//! arrives through an injected [`store::AttributeStore`] and market prices
//! through an async [`store::PriceSource`].

pub mod bonus;
pub mod calculator;
pub mod cost;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod projection;
pub mod store;

pub use calculator::Calculator;
pub use error::CalcError;
