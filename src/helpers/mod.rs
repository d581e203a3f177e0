//! Helper functions shared by components, templates and the server

mod html;
mod list;
mod url;

pub use html::*;
pub use list::*;
pub use url::*;
