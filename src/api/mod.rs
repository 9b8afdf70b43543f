mod chat;
mod docs;
mod root;

pub use chat::api_chat;
pub use docs::{ApiDoc, DOCS_TITLE, OPENAPI_PATH, api_docs, api_openapi};
pub use root::{WELCOME, api_root};
