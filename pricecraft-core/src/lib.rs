//! pricecraft-core: validation and template filling for bulk price updates
//!
//! The library cross-references pasted (SKU, New Price) rows against a
//! publicly shared reference sheet, flags hard-fail and unpublished
//! conditions, and fills a fixed-layout xlsx upload template once the
//! download gate is open.

pub mod checks;
pub mod config;
pub mod error;
pub mod input;
pub mod reference;
pub mod report;
pub mod session;
pub mod writer;

pub use checks::merge_and_validate;
pub use config::ToolConfig;
pub use error::{FetchError, StateError, TemplateError};
pub use input::{InputRow, parse_pasted};
pub use reference::{ReferenceMap, ReferenceRow, fetch_reference};
pub use report::{FailReason, MergedRow, ValidationReport};
pub use session::{Session, SessionState};
