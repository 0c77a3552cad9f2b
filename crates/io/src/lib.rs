// Spreadsheet I/O for the transfer engine

pub mod upload;
pub mod xlsx;

pub use upload::{check_upload_name, UploadCheck, UPLOAD_EXTENSIONS};
pub use xlsx::{read_grid, read_grid_from_bytes, write_report, write_report_to_buffer};
