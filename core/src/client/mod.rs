//! Remote tool client, transport seam and retry policy

pub mod remote;
pub mod retry;
pub mod transport;

pub use remote::{RemoteToolClient, EXECUTE_PATH, HEALTH_PATH};
pub use retry::{is_transient_status, AttemptFailure, RetryPolicy};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, Transport, TransportError,
    TransportErrorKind,
};
