pub mod client;
pub mod intent;
pub mod widget;

pub use client::{ClientError, FileClient, UploadReply};
pub use intent::Intent;
pub use widget::{Author, ChatWidget, Message, Submission, WidgetState};
