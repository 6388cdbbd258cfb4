pub mod chat_client;
pub mod video_client;

pub use chat_client::ChatClient;
pub use video_client::VideoClient;
