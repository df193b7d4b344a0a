pub mod engine;
pub mod extract;
pub mod retry;
pub mod scrape;
pub mod uri;
pub mod wait;

pub use crate::domain::model::{
    ArtworkMetadata, ArtworkReference, CheckKind, GatewayPair, TokenSummary, VerificationResult,
    VerificationStatus,
};
pub use crate::domain::ports::{
    ArtworkSource, ButtonLookup, ConfigProvider, PageDriver, ResultSink, Storage, Verifier,
};
pub use crate::utils::error::Result;
