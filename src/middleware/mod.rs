pub mod identity;
pub mod request_id;

pub use identity::{caller_identity_middleware, Caller, USER_ID_HEADER};
pub use request_id::{make_span_with_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};
