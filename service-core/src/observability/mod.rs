pub mod logging;
pub mod propagation;

pub use logging::init_tracing;
pub use propagation::{
    TRACEPARENT_HEADER, TRACESTATE_HEADER, WithTraceContext, current_trace_headers,
    extract_traceparent,
};
