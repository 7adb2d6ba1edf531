mod error;
mod traits;
mod url;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use traits::{LogicalFolder, ObjectStore};
pub use url::{object_name, rename_url_segment};
