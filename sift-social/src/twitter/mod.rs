//! Twitter/X capture-bundle pipeline.
//!
//! Flow: [`assemble::DatasetAssembler`] walks bundle files in order, each file goes
//! through [`bundle::process_bundle`] which descends the search timeline wrapper and
//! hands every post candidate to [`extract::extract_post`]. All JSON descent goes
//! through [`path`] so a missing link anywhere degrades to "nothing here".
pub mod assemble;
pub mod bundle;
pub mod extract;
pub mod path;
pub mod types;

pub use assemble::{write_dataset, Dataset, DatasetAssembler};
pub use bundle::{process_bundle, read_bundle, BundleError};
pub use extract::{extract_post, Rejection};
pub use types::{CaptureRecord, Entities, PostRecord};
