//! Multi-table transfer report: suggestion list, summary, and rollups by
//! origin and destination store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;

use crate::config::TransferConfig;
use crate::error::EngineError;
use crate::model::SuggestionRecord;

pub const SHEET_SUGGESTIONS: &str = "Sugestões de Transferência";
pub const SHEET_SUMMARY: &str = "Resumo";
pub const SHEET_BY_ORIGIN: &str = "Resumo por Loja Origem";
pub const SHEET_BY_DESTINATION: &str = "Resumo por Loja Destino";

pub const COL_PRODUCT_CODE: &str = "Código do Produto";
pub const COL_PRODUCT_DESCRIPTION: &str = "Descrição do Produto";
pub const COL_ORIGIN: &str = "Loja de Origem";
pub const COL_ORIGIN_SALES: &str = "Vendas na Origem";
pub const COL_ORIGIN_STOCK: &str = "Estoque na Origem";
pub const COL_DESTINATION: &str = "Loja de Destino Sugerida";
pub const COL_DESTINATION_SALES: &str = "Vendas no Destino";
pub const COL_QUANTITY: &str = "Quantidade a Transferir";

pub const COL_METRIC: &str = "Métrica";
pub const COL_VALUE: &str = "Valor";
pub const COL_PRODUCT_COUNT: &str = "Número de Produtos";
pub const COL_ITEM_TOTAL: &str = "Total de Itens";

pub const METRIC_TOTAL: &str = "Total de Sugestões";
pub const METRIC_PRODUCTS: &str = "Produtos Únicos";
pub const METRIC_ORIGINS: &str = "Lojas de Origem Envolvidas";
pub const METRIC_DESTINATIONS: &str = "Lojas de Destino Envolvidas";
pub const METRIC_GENERATED_AT: &str = "Data da Análise";

const GENERATED_AT_FORMAT: &str = "%d/%m/%Y %H:%M";

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    Text(String),
    Number(f64),
}

impl From<&str> for ReportValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ReportValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for ReportValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<usize> for ReportValue {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

/// A named table, written as one sheet with a header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ReportValue>>,
}

impl ReportTable {
    fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Cell at (row, column name), header excluded.
    pub fn value(&self, row: usize, column: &str) -> Option<&ReportValue> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub tables: Vec<ReportTable>,
}

impl Report {
    pub fn table(&self, name: &str) -> Option<&ReportTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

// ---------------------------------------------------------------------------
// Store name normalization
// ---------------------------------------------------------------------------

fn digit_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// "LJ 3Tatuape" -> "Tatuape": drop the prefix token and digits, then trim.
pub fn normalize_store_name(name: &str, prefix: &str) -> String {
    let without_prefix = if prefix.is_empty() {
        name.to_string()
    } else {
        name.replace(prefix, "")
    };
    digit_runs()
        .replace_all(&without_prefix, "")
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReportBuilder {
    store_prefix: String,
}

impl ReportBuilder {
    pub fn new(store_prefix: impl Into<String>) -> Self {
        Self {
            store_prefix: store_prefix.into(),
        }
    }

    pub fn from_config(config: &TransferConfig) -> Self {
        Self::new(config.store_prefix.clone())
    }

    pub fn build(
        &self,
        suggestions: &[SuggestionRecord],
        generated_at: NaiveDateTime,
    ) -> Result<Report, EngineError> {
        if suggestions.is_empty() {
            return Err(EngineError::EmptyReport);
        }

        let rows: Vec<NormalizedRow<'_>> = suggestions
            .iter()
            .map(|s| NormalizedRow {
                record: s,
                origin: normalize_store_name(s.origin_store.as_str(), &self.store_prefix),
                destination: normalize_store_name(s.destination_store.as_str(), &self.store_prefix),
            })
            .collect();

        Ok(Report {
            tables: vec![
                suggestions_table(&rows),
                summary_table(&rows, generated_at),
                rollup_table(SHEET_BY_ORIGIN, COL_ORIGIN, &rows, |r| r.origin.as_str()),
                rollup_table(SHEET_BY_DESTINATION, COL_DESTINATION, &rows, |r| r.destination.as_str()),
            ],
        })
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::from_config(&TransferConfig::default())
    }
}

struct NormalizedRow<'a> {
    record: &'a SuggestionRecord,
    origin: String,
    destination: String,
}

fn suggestions_table(rows: &[NormalizedRow<'_>]) -> ReportTable {
    let mut table = ReportTable::new(
        SHEET_SUGGESTIONS,
        &[
            COL_PRODUCT_CODE,
            COL_PRODUCT_DESCRIPTION,
            COL_ORIGIN,
            COL_ORIGIN_SALES,
            COL_ORIGIN_STOCK,
            COL_DESTINATION,
            COL_DESTINATION_SALES,
            COL_QUANTITY,
        ],
    );
    for row in rows {
        let s = row.record;
        table.rows.push(vec![
            s.product_code.as_str().into(),
            s.product_description.as_str().into(),
            row.origin.as_str().into(),
            s.origin_sales.into(),
            s.origin_stock.into(),
            row.destination.as_str().into(),
            s.destination_sales.into(),
            s.transfer_quantity.into(),
        ]);
    }
    table
}

fn summary_table(rows: &[NormalizedRow<'_>], generated_at: NaiveDateTime) -> ReportTable {
    let products: BTreeSet<&str> = rows.iter().map(|r| r.record.product_code.as_str()).collect();
    let origins: BTreeSet<&str> = rows.iter().map(|r| r.origin.as_str()).collect();
    let destinations: BTreeSet<&str> = rows.iter().map(|r| r.destination.as_str()).collect();

    let mut table = ReportTable::new(SHEET_SUMMARY, &[COL_METRIC, COL_VALUE]);
    table.rows = vec![
        vec![METRIC_TOTAL.into(), rows.len().into()],
        vec![METRIC_PRODUCTS.into(), products.len().into()],
        vec![METRIC_ORIGINS.into(), origins.len().into()],
        vec![METRIC_DESTINATIONS.into(), destinations.len().into()],
        vec![
            METRIC_GENERATED_AT.into(),
            generated_at.format(GENERATED_AT_FORMAT).to_string().into(),
        ],
    ];
    table
}

/// Count and quantity sum per store, keys ascending.
fn rollup_table<'a, F>(
    name: &str,
    key_column: &str,
    rows: &'a [NormalizedRow<'a>],
    key: F,
) -> ReportTable
where
    F: Fn(&'a NormalizedRow<'a>) -> &'a str,
{
    let mut groups: BTreeMap<&'a str, (usize, f64)> = BTreeMap::new();
    for row in rows {
        let entry = groups.entry(key(row)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += row.record.transfer_quantity;
    }

    let mut table = ReportTable::new(name, &[key_column, COL_PRODUCT_COUNT, COL_ITEM_TOTAL]);
    table.rows = groups
        .into_iter()
        .map(|(store, (count, total))| vec![store.into(), count.into(), total.into()])
        .collect();
    table
}
