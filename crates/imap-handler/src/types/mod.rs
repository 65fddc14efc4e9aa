//! Public output types of the parser.

mod attribute;
mod response;

pub use attribute::{Attribute, Partial};
pub use response::{Response, STATUS_RESPONSES, is_status_command};
