//! XML utilities: namespace-aware navigation and subtree serialization.

mod serialize;
mod utils;

pub use serialize::{serialize_element, XML_DECLARATION};
pub use utils::{find_by_path, find_child, find_descendants, get_text, has_tag};
