mod cors;
mod environment;
mod error;
mod extractors;

pub use cors::CorsConfig;
pub use environment::Environment;
pub use error::{ApiErrorResponse, AppError};
pub use extractors::ValidatedJson;
