pub use super::email_record::Entity as EmailRecord;
pub use super::reply_record::Entity as ReplyRecord;
