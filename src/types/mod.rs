//! Request, response and conversation types.

mod functions;
mod message;
mod metadata;
mod request;
mod response;

pub use functions::*;
pub use message::*;
pub use metadata::*;
pub use request::*;
pub use response::*;
