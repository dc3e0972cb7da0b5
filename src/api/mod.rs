//! Client for the document management backend

mod client;
mod errors;
mod files;
mod tags;
mod types;

pub use client::{ApiClient, Envelope, SUCCESS_CODE};
pub use errors::{ApiError, ApiResult};
pub use types::*;
