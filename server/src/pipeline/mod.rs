pub mod ingest;
pub mod jobs;
pub mod replies;

pub use ingest::ingest_recent_threads;
pub use jobs::{run_reply_job, ReplyJob, ReplyJobs};
