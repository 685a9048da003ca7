pub mod tag_record;

pub use tag_record::{TagRecordService, TagRecordStore};
