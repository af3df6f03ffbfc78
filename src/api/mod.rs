//! HTTP front-end over the analysis runner.

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{
    ALLOWED_ORIGINS, ApiState, SharedState, UploadedFile, build_router, missing_required_files,
    stage_and_analyze,
};
