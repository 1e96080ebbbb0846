pub mod email_record;
pub mod reply_record;
