// Library half of the CLI: the generate/export service shared by the
// binary and integration tests.

pub mod service;

pub use service::{
    ErrorResponse, ExportFile, GenerateResponse, ServiceError, StatusClass, TransferService, Upload,
};
