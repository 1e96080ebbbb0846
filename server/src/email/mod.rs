pub mod client;
pub mod gateway;
pub mod thread;

pub use gateway::{FileDownload, MailboxGateway};
pub use thread::{FileMeta, Message, Thread};
