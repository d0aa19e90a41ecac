//! Configuration access port trait.

/// Raw key lookup. Typed parsing and validation happen in the domain so that
/// a malformed value is reported instead of replaced by a default.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
