pub mod tag_record;

pub use tag_record::{Limit, TagKey, TagRecord, TagRecordResponse};
