//! `SeaORM` entities for the email and reply archives.

pub mod prelude;

pub mod email_record;
pub mod reply_record;
