mod chat_model_canned;
mod clock_system;
mod token_store_memory;

pub use chat_model_canned::*;
pub use clock_system::*;
pub use token_store_memory::*;
