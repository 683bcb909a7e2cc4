mod timer;
pub use timer::Timer;

#[derive(thiserror::Error, Debug)]
#[error("Filesystem path is not valid UTF-8")]
pub struct PathEncodingError;

pub type Hasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;
pub type HashMap<K, V> = std::collections::HashMap<K, V, Hasher>;
pub type HashSet<T> = std::collections::HashSet<T, Hasher>;

/// Convert a filesystem name to an owned `String`, failing on non-UTF-8 names.
pub fn os_str_to_string(name: &std::ffi::OsStr) -> Result<String, PathEncodingError> {
    name.to_str().map(str::to_owned).ok_or(PathEncodingError)
}
