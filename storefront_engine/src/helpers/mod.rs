mod doc_path;
mod timestamps;

pub use doc_path::{DocPath, DocPathError};
pub use timestamps::next_update_timestamp;
