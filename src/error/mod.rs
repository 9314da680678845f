mod app_error;
mod conversions;
mod db_mapping;
mod extractors;


pub use app_error::{AppError, AppResult, ValidationIssue};
pub use extractors::{json_error_handler, path_error_handler, query_error_handler};
