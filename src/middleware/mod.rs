pub mod response;
pub mod validate_body;

pub use response::{ApiResponse, ApiResult};
pub use validate_body::{Payload, RequestSchema, TenantScope, Validated};
