mod session_authenticator;

pub use session_authenticator::*;
