mod error;
mod handler;
mod router;

pub use error::{SIGN_IN_PATH, recover_error};
pub use router::routes;
