use std::fmt;

use serde::Serialize;

use crate::schema::StoreId;

// ---------------------------------------------------------------------------
// Decoded products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StoreMetrics {
    pub sales: f64,
    pub stock: f64,
}

impl StoreMetrics {
    pub fn new(sales: f64, stock: f64) -> Self {
        Self { sales, stock }
    }

    /// Stock sitting in a store that sold none of it.
    pub fn is_idle(&self) -> bool {
        self.sales == 0.0 && self.stock > 0.0
    }
}

/// A product row with one metrics entry per configured store, in store order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub code: String,
    pub description: String,
    pub metrics: Vec<(StoreId, StoreMetrics)>,
}

impl ProductRecord {
    pub fn metrics_for(&self, store: &str) -> Option<StoreMetrics> {
        self.metrics
            .iter()
            .find(|(id, _)| id.as_str() == store)
            .map(|(_, m)| *m)
    }
}

// ---------------------------------------------------------------------------
// Row outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingCode,
    MissingDescription,
    SubGroupHeader,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCode => write!(f, "missing_code"),
            Self::MissingDescription => write!(f, "missing_description"),
            Self::SubGroupHeader => write!(f, "sub_group_header"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Decoded(ProductRecord),
    Skipped(SkipReason),
}

/// A product row that was admitted but not decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowDiagnostic {
    /// Zero-based row index in the source grid.
    pub row: usize,
    pub reason: SkipReason,
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRecord {
    #[serde(rename = "produto_codigo")]
    pub product_code: String,
    #[serde(rename = "produto_descricao")]
    pub product_description: String,
    #[serde(rename = "loja_origem")]
    pub origin_store: StoreId,
    #[serde(rename = "vendas_loja_origem")]
    pub origin_sales: f64,
    #[serde(rename = "estoque_loja_origem")]
    pub origin_stock: f64,
    #[serde(rename = "loja_destino_sugerida")]
    pub destination_store: StoreId,
    #[serde(rename = "vendas_loja_destino")]
    pub destination_sales: f64,
    #[serde(rename = "quantidade_transferir")]
    pub transfer_quantity: f64,
}
