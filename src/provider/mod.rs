pub mod openai;
pub mod traits;

pub use openai::OpenAiResponsesClient;
pub use traits::{ModelProvider, ModelRequest};
