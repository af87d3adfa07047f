pub mod cache;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod operation;
pub mod ports;
pub mod progress;
pub mod session;
pub mod validation;

pub use cache::DocumentCache;
pub use coordinator::MutationCoordinator;
pub use domain::{
    ContentMetadata, DocumentContent, DocumentRecord, HealthReport, LibrarySummary, QueryAnswer,
    QueryExchange, UploadFile, UploadReceipt,
};
pub use error::{ClientError, ClientResult};
pub use operation::{OperationKind, OperationState};
pub use ports::{BackendGateway, PortResult, TransportError};
pub use progress::{
    FixedIncrements, IncrementSource, ProgressConfig, ProgressPhase, RandomIncrements,
    UploadProgress, UploadProgressEstimator,
};
pub use session::{QuerySession, SUGGESTED_QUESTIONS};
