// Request/response access to the backend with endpoint fallback
mod api;
mod fetch;
mod offline;
mod router;

pub use api::{
    AgentPayload, ChatApi, LoginRequest, ProfileUpdate, RegisterRequest, SendMessageRequest,
};
pub use fetch::{
    HttpRequest, HttpResponse, HttpTransport, RequestOptions, RequestOutcome, TimeoutFetch,
};
pub use offline::offline_substitute;
pub use router::{ApiResponse, RequestRouter};
