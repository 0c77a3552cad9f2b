//! Store-column encoding: each store owns a `[sales, stock]` column pair,
//! laid out left to right in configured store order from a fixed offset.

use std::fmt;

use serde::Serialize;

use crate::config::TransferConfig;

/// A configured store, identified by its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StoreId(String);

impl StoreId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricField {
    Sales,
    Stock,
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sales => write!(f, "sales"),
            Self::Stock => write!(f, "stock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreColumns {
    pub store: StoreId,
    pub sales_col: usize,
    pub stock_col: usize,
}

impl StoreColumns {
    pub fn column(&self, field: MetricField) -> usize {
        match field {
            MetricField::Sales => self.sales_col,
            MetricField::Stock => self.stock_col,
        }
    }
}

/// Column positions for every configured store, built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSchema {
    columns: Vec<StoreColumns>,
}

impl StoreSchema {
    pub fn new<I, S>(stores: I, start_col: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = stores
            .into_iter()
            .enumerate()
            .map(|(i, name)| StoreColumns {
                store: StoreId::new(name),
                sales_col: start_col + 2 * i,
                stock_col: start_col + 2 * i + 1,
            })
            .collect();
        Self { columns }
    }

    pub fn from_config(config: &TransferConfig) -> Self {
        Self::new(config.stores.iter().cloned(), config.metrics_start_col)
    }

    pub fn columns(&self) -> &[StoreColumns] {
        &self.columns
    }

    pub fn stores(&self) -> impl Iterator<Item = &StoreId> {
        self.columns.iter().map(|c| &c.store)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_of(&self, store: &str, field: MetricField) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.store.as_str() == store)
            .map(|c| c.column(field))
    }

    /// One past the last column the schema reads.
    pub fn width(&self) -> usize {
        self.columns.last().map(|c| c.stock_col + 1).unwrap_or(0)
    }
}
