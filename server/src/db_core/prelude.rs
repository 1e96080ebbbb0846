#![allow(unused_imports)]
pub use entity::{email_record, prelude::*, reply_record};
pub use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveValue, ColumnTrait, ConnectOptions, Database,
    DatabaseConnection, DbErr, EntityTrait, InsertResult, QueryFilter, QueryOrder,
};
