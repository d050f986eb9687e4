pub mod jwt;
pub mod object_storage;
pub mod storage;
