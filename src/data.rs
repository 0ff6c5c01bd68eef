// src/data.rs
//
// Records that flow through the pipeline.
//
// - EntityDescriptor: one discovered city, produced by discovery and read-only after.
// - ClimateRecord:    one exported row, produced by a detail worker.
// - Limit:            cap on how many discovered entities are fetched.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A fetchable entity (city) as presented by the remote selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub name: String,
    pub region: String,
    /// Source-assigned id, appended to the detail URL.
    pub remote_id: String,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>, region: impl Into<String>, remote_id: impl Into<String>) -> Self {
        Self { name: name.into(), region: region.into(), remote_id: remote_id.into() }
    }
}

/// Discovery result, keyed by entity name.
pub type Discovered = BTreeMap<String, EntityDescriptor>;

/// One exported row. Field text is kept as scraped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClimateRecord {
    pub entity_id: String,
    pub region: String,
    pub min_temp: String,
    pub max_temp: String,
    pub precipitation: String,
    pub month: String,
}

impl ClimateRecord {
    /// Placeholder for a unit that failed: identity kept, extracted fields empty.
    pub fn partial(entity: &EntityDescriptor) -> Self {
        Self {
            entity_id: entity.remote_id.clone(),
            region: entity.region.clone(),
            min_temp: s!(),
            max_temp: s!(),
            precipitation: s!(),
            month: s!(),
        }
    }

    pub fn is_partial(&self) -> bool {
        self.min_temp.is_empty()
            && self.max_temp.is_empty()
            && self.precipitation.is_empty()
            && self.month.is_empty()
    }

    /// Cells in `config::consts::COLUMNS` order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.entity_id.clone(),
            self.region.clone(),
            self.min_temp.clone(),
            self.max_temp.clone(),
            self.precipitation.clone(),
            self.month.clone(),
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Limit {
    #[default]
    Unlimited,
    Max(usize),
}

impl Limit {
    /// `min(count, limit)`; unlimited keeps everything.
    pub fn effective(self, count: usize) -> usize {
        match self {
            Limit::Unlimited => count,
            Limit::Max(n) => n.min(count),
        }
    }
}

impl FromStr for Limit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.trim();
        match v.to_ascii_lowercase().as_str() {
            "unlimited" | "inf" | "all" => Ok(Limit::Unlimited),
            _ => v
                .parse::<usize>()
                .map(Limit::Max)
                .map_err(|_| format!("Invalid limit: {v} (expected a number or 'unlimited')")),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Unlimited => f.write_str("unlimited"),
            Limit::Max(n) => write!(f, "{n}"),
        }
    }
}
