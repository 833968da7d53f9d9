//! Content Source Adapter: fetches a page's recent posts and videos and
//! selects the one item an orchestration run will advertise.

pub mod selector;
pub mod source;

pub use selector::ContentSelector;
pub use source::{ContentSource, GraphContentSource, PagePost, PageVideo};
