//! Inkwell engine: upload transport, batch runner and effect execution.
mod engine;
mod persist;
mod runner;
mod transport;
mod types;

pub use engine::{EngineError, EngineHandle};
pub use persist::{ensure_output_dir, ContentStore, PersistError};
pub use runner::{run_batch, BatchRequest, CancelRegistry};
pub use transport::{
    ChannelProgressSink, ProgressSink, ReqwestTransport, TransportSettings, UploadOptions,
    UploadTransport,
};
pub use types::{EngineEvent, FailureKind, UploadError, UploadReceipt};
