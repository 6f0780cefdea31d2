use std::io;

/// Hierarchical key/value store addressed by backslash-separated key paths
/// relative to the per-user root (`HKEY_CURRENT_USER` on Windows).
///
/// The empty value name addresses a key's default value.
pub trait RegistryStore {
    fn set_string(&mut self, path: &str, name: &str, value: &str) -> io::Result<()>;

    fn set_marker(&mut self, path: &str, name: &str) -> io::Result<()>;

    /// Reads a string value. Missing key or value is `ErrorKind::NotFound`.
    fn get_string(&self, path: &str, name: &str) -> io::Result<String>;

    /// Deletes a single value. Missing key or value is `ErrorKind::NotFound`.
    fn delete_value(&mut self, path: &str, name: &str) -> io::Result<()>;

    fn subkeys(&self, path: &str) -> io::Result<Vec<String>>;

    /// Deletes a key that has no children.
    fn delete_key(&mut self, path: &str) -> io::Result<()>;

    fn key_exists(&self, path: &str) -> io::Result<bool> {
        match self.subkeys(path) {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

pub fn join_key(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!(r"{parent}\{child}")
    }
}

pub fn read_string_if_present(
    store: &dyn RegistryStore,
    path: &str,
    name: &str,
) -> io::Result<Option<String>> {
    match store.get_string(path, name) {
        Ok(value) => Ok(Some(value)),
        Err(err) if is_not_found(&err) => Ok(None),
        Err(err) => Err(err),
    }
}

pub fn delete_value_if_present(
    store: &mut dyn RegistryStore,
    path: &str,
    name: &str,
) -> io::Result<bool> {
    match store.delete_value(path, name) {
        Ok(()) => Ok(true),
        Err(err) if is_not_found(&err) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Deletes `path` and everything beneath it, children first.
///
/// Never fails: missing keys count as already deleted and any other failure
/// (typically a key held open elsewhere) is logged and skipped.
pub fn delete_key_recursive(store: &mut dyn RegistryStore, path: &str) {
    let children = match store.subkeys(path) {
        Ok(children) => children,
        Err(err) if is_not_found(&err) => return,
        Err(err) => {
            log::warn!("Could not enumerate registry key {path}: {err}");
            Vec::new()
        }
    };

    for child in children {
        delete_key_recursive(store, &join_key(path, &child));
    }

    match store.delete_key(path) {
        Ok(()) => log::debug!("Deleted registry key {path}"),
        Err(err) if is_not_found(&err) => {}
        Err(err) => log::warn!("Could not delete registry key {path}: {err}"),
    }
}
