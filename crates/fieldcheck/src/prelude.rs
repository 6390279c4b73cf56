//! Prelude module - common imports for fieldcheck users
//!
//! ```rust
//! use fieldcheck::prelude::*;
//! ```

pub use crate::{
    // Grid types
    CellValue,
    // Error types
    Error,
    // Pipeline types
    FieldValue,
    Ingestor,
    MetadataValue,
    NormalizedRecord,
    OpenOptions,
    ParseOptions,
    ParseResult,
    RawGrid,
    Result,
    Schema,
    SignedDuration,
    Timeliness,
};
