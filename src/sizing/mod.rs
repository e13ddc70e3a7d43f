//! Dehumidifier sizing and multi-unit recommendation engine.
//!
//! Converts a room or pool-hall description into a required moisture-removal
//! load, searches a product catalog for single- and multi-unit combinations,
//! and returns a ranked recommendation or a human-review escalation.
//!
//! # Architecture
//!
//! - **Rules**: Margin bands, pool multipliers and derating tables loaded from
//!   TOML (or embedded defaults)
//! - **Load**: Infiltration, occupants and special loads in L/24h; pool halls
//!   are additionally constrained on effective surface area, with open-water
//!   evaporation reported from activity, air movement and cover hours
//! - **Screening**: Installation-type preference and cold-band auto-defrost
//! - **Derating**: Pluggable curve from rated to effective capacity
//! - **Ranking**: Explicit rejection reasons, deterministic tie-breaks
//! - **Escalation**: Catalog and feasibility problems returned as data
//!
//! # Example
//!
//! ```ignore
//! use dehum_sizing::sizing::{default_rules, SizingEngine};
//!
//! let engine = SizingEngine::new(default_rules());
//! let result = engine.compute(&request, &catalog.products)?;
//!
//! if result.escalate {
//!     println!("Needs review: {:?}", result.escalation_reason);
//! }
//! if let Some(rec) = result.recommendation {
//!     println!("{} x {} ({:.1}% margin)", rec.quantity, rec.sku, rec.margin_pct);
//! }
//! ```

pub mod combination;
pub mod derating;
mod engine;
pub mod escalation;
pub mod load;
pub mod ranker;
mod rules;
mod types;
pub mod validation;

pub use derating::{DeratingCurve, DewPointDerating, NoDerating, RatingCondition, TableDerating};
pub use engine::{compute_sizing, SizingEngine};
pub use load::{aggregate_loads, evaporation_lpd, Climate, Exposure};
pub use rules::{default_rules, load_rules, validate_rules};
pub use types::*;
