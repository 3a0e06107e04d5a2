pub mod date_resolver;
pub mod debounce;
pub mod format;
pub mod keys;
pub mod notice;
pub mod selection;
pub mod session;
pub mod slot_extractor;
