//! `rebalance-engine`: stock transfer suggestions from multi-store
//! inventory grids.
//!
//! Pure engine crate: receives an already-read cell grid, returns
//! suggestions and report tables. No file or spreadsheet IO.

pub mod config;
pub mod decode;
pub mod error;
pub mod grid;
pub mod locate;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod store;
pub mod suggest;

pub use config::TransferConfig;
pub use error::EngineError;
pub use grid::{Cell, RawGrid};
pub use model::{ProductRecord, RowDiagnostic, SkipReason, StoreMetrics, SuggestionRecord};
pub use pipeline::{run, TransferRun};
pub use report::{Report, ReportBuilder, ReportTable, ReportValue};
pub use schema::{StoreId, StoreSchema};
pub use store::{SessionHandle, SuggestionStore};
