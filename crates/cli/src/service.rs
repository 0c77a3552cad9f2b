//! Generate / export operations over uploaded inventory spreadsheets.
//!
//! This is the boundary layer: it validates uploads, runs the engine,
//! keeps each caller's suggestion set under its own [`SessionHandle`], and
//! turns every failure into a [`ServiceError`] with a status class. Any
//! transport (CLI today) sits on top of it.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use chrono::{Local, NaiveDateTime};
use log::{error, info};
use serde::Serialize;

use rebalance_engine::{
    pipeline, EngineError, RawGrid, Report, ReportBuilder, RowDiagnostic, SessionHandle,
    SuggestionRecord, SuggestionStore, TransferConfig,
};
use rebalance_io::{check_upload_name, read_grid_from_bytes, write_report_to_buffer, UploadCheck};

pub const EXPORT_FILENAME_PREFIX: &str = "sugestoes_transferencia_";
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const GENERIC_SERVER_MESSAGE: &str = "internal error while processing the request";

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub handle: SessionHandle,
    pub suggestions: Vec<SuggestionRecord>,
    pub total_suggestions: usize,
    pub processed_products: usize,
    /// Admitted rows that did not decode. Not part of the wire response.
    #[serde(skip)]
    pub diagnostics: Vec<RowDiagnostic>,
}

#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Client,
    Server,
}

impl StatusClass {
    pub fn code(self) -> u16 {
        match self {
            StatusClass::Client => 400,
            StatusClass::Server => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    MissingFilename,
    UnsupportedFile { filename: String },
    InvalidConfig(String),
    LayoutNotFound { anchor: String },
    EmptyReport,
    Read(String),
    Write(String),
    /// Anything the boundary did not anticipate. Logged in full, never
    /// echoed to the caller.
    Unexpected(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusClass {
        match self {
            ServiceError::Write(_) | ServiceError::Unexpected(_) => StatusClass::Server,
            _ => StatusClass::Client,
        }
    }

    /// Caller-facing body. Server-class errors carry no internal detail.
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self.status() {
            StatusClass::Client => self.to_string(),
            StatusClass::Server => GENERIC_SERVER_MESSAGE.to_string(),
        };
        ErrorResponse { error }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFilename => write!(f, "no file selected"),
            Self::UnsupportedFile { filename } => {
                write!(f, "only Excel files are accepted (.xlsx, .xls), got '{filename}'")
            }
            Self::InvalidConfig(msg) => write!(f, "{msg}"),
            Self::LayoutNotFound { anchor } => write!(
                f,
                "could not find the store data in the spreadsheet; expected a row containing '{anchor}'"
            ),
            Self::EmptyReport => {
                write!(f, "no suggestions available to export; upload a spreadsheet first")
            }
            Self::Read(msg) => write!(f, "failed to read spreadsheet: {msg}"),
            Self::Write(msg) => write!(f, "failed to build export file: {msg}"),
            Self::Unexpected(msg) => write!(f, "unexpected failure: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::LayoutNotFound { anchor } => ServiceError::LayoutNotFound { anchor },
            EngineError::EmptyReport => ServiceError::EmptyReport,
            EngineError::ConfigParse(_) | EngineError::ConfigValidation(_) => {
                ServiceError::InvalidConfig(err.to_string())
            }
        }
    }
}

fn unexpected(context: &str, detail: String) -> ServiceError {
    error!("{context}: {detail}");
    ServiceError::Unexpected(detail)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

pub fn export_filename(at: NaiveDateTime) -> String {
    format!("{}{}.xlsx", EXPORT_FILENAME_PREFIX, at.format(EXPORT_TIMESTAMP_FORMAT))
}

// ============================================================================
// Service
// ============================================================================

#[derive(Clone)]
pub struct TransferService {
    config: TransferConfig,
    store: SuggestionStore,
    reports: ReportBuilder,
}

impl TransferService {
    pub fn new(config: TransferConfig) -> Result<Self, ServiceError> {
        Self::with_store(config, SuggestionStore::new())
    }

    pub fn with_store(config: TransferConfig, store: SuggestionStore) -> Result<Self, ServiceError> {
        config.validate()?;
        let reports = ReportBuilder::from_config(&config);
        Ok(Self { config, store, reports })
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    pub fn store(&self) -> &SuggestionStore {
        &self.store
    }

    /// Validate and read an upload, derive suggestions, and keep them under
    /// a fresh handle for a later export.
    pub fn generate(&self, upload: Upload) -> Result<GenerateResponse, ServiceError> {
        self.generate_with(upload, read_grid_from_bytes)
    }

    /// `generate` with the spreadsheet reader supplied. Reading and the
    /// engine run share one panic guard; the reader parses untrusted bytes.
    fn generate_with<R>(&self, upload: Upload, read: R) -> Result<GenerateResponse, ServiceError>
    where
        R: FnOnce(&[u8]) -> Result<RawGrid, String>,
    {
        match check_upload_name(&upload.filename) {
            UploadCheck::Accepted => {}
            UploadCheck::MissingName => return Err(ServiceError::MissingFilename),
            UploadCheck::UnsupportedExtension => {
                return Err(ServiceError::UnsupportedFile { filename: upload.filename })
            }
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let grid = read(&upload.bytes).map_err(ServiceError::Read)?;
            pipeline::run(&grid, &self.config).map_err(ServiceError::from)
        }))
        .map_err(|payload| unexpected("generate panicked", panic_message(&*payload)))?;
        let run = outcome?;

        let handle = self.store.insert(run.suggestions.clone());
        info!(
            "generated {} suggestions from '{}' ({} products) as {}",
            run.suggestions.len(),
            upload.filename,
            run.processed_products,
            handle
        );

        Ok(GenerateResponse {
            success: true,
            handle,
            total_suggestions: run.suggestions.len(),
            suggestions: run.suggestions,
            processed_products: run.processed_products,
            diagnostics: run.diagnostics,
        })
    }

    /// Build the report workbook for `handle`, stamped with the local time.
    pub fn export(&self, handle: &SessionHandle) -> Result<ExportFile, ServiceError> {
        self.export_at(handle, Local::now().naive_local())
    }

    pub fn export_at(&self, handle: &SessionHandle, now: NaiveDateTime) -> Result<ExportFile, ServiceError> {
        self.export_with(handle, now, write_report_to_buffer)
    }

    /// `export_at` with the workbook writer supplied. Building and writing
    /// the report share one panic guard.
    fn export_with<W>(&self, handle: &SessionHandle, now: NaiveDateTime, write: W) -> Result<ExportFile, ServiceError>
    where
        W: FnOnce(&Report) -> Result<Vec<u8>, String>,
    {
        let suggestions = self.store.get(handle).ok_or(ServiceError::EmptyReport)?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let report = self.reports.build(&suggestions, now)?;
            write(&report).map_err(|e| {
                error!("export for {handle} failed: {e}");
                ServiceError::Write(e)
            })
        }))
        .map_err(|payload| unexpected("export panicked", panic_message(&*payload)))?;
        let bytes = outcome?;

        let filename = export_filename(now);
        info!("exported {} suggestions for {} as {}", suggestions.len(), handle, filename);
        Ok(ExportFile { filename, bytes })
    }
}
