pub mod file_record;
pub mod storage;

pub use file_record::FileRecord;
