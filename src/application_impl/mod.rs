mod session_accessor;
mod session_authenticator_fake;
mod session_authenticator_impl;
mod state_signer;

pub use session_accessor::*;
pub use session_authenticator_fake::*;
pub use session_authenticator_impl::*;
pub use state_signer::*;
