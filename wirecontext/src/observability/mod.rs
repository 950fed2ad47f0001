//! Observability utilities.

mod logging;
mod tracing;

pub use self::logging::{build_subscriber, init_tracing, LoggingConfig};
pub use self::tracing::{
    LoggingMergeObserver, MergeObserver, MergeSpanAttributes, NoOpMergeObserver, SpanTimer,
};
