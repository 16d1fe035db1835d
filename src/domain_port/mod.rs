// store

mod token_store;

pub use token_store::*;

// upstream

mod activity_source;
mod token_endpoint;

pub use activity_source::*;
pub use token_endpoint::*;

// assistant

mod chat_model;

pub use chat_model::*;

// runtime

mod clock;

pub use clock::*;
