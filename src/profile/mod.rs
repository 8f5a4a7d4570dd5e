//! Resume data model and local persistence

pub mod types;
pub mod storage;
pub mod store;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::ProfileStore;
pub use types::{CVRecord, Education, Experience, ResumeProfile, Session, View};
