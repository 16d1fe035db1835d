mod chat;
mod session;
mod token;
mod week;

pub use chat::*;
pub use session::*;
pub use token::*;
pub use week::*;
