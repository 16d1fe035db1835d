mod activity_source_reqwest;
mod chat_model_openai;
mod token_client_reqwest;

pub use activity_source_reqwest::*;
pub use chat_model_openai::*;
pub use token_client_reqwest::*;
