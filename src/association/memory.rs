use std::collections::{BTreeMap, BTreeSet};
use std::io;

use super::store::RegistryStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    String(String),
    Marker,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredKey {
    name: String,
    values: BTreeMap<String, StoredValue>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: BTreeMap<String, StoredKey>,
    denied_prefixes: Vec<String>,
    locked_keys: BTreeSet<String>,
}

fn fold(path: &str) -> String {
    path.trim_matches('\\').to_ascii_lowercase()
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{path} not found"))
}

impl MemoryStore {
    pub fn deny_writes(&mut self, prefix: &str) {
        self.denied_prefixes.push(fold(prefix));
    }

    pub fn lock_key(&mut self, path: &str) {
        self.locked_keys.insert(fold(path));
    }

    pub fn snapshot(&self) -> BTreeMap<String, StoredKey> {
        self.keys.clone()
    }

    pub fn value_names(&self, path: &str) -> Vec<String> {
        self.keys
            .get(&fold(path))
            .map(|key| key.values.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn check_writable(&self, path: &str) -> io::Result<()> {
        let folded = fold(path);
        let denied = self.denied_prefixes.iter().any(|prefix| {
            folded == *prefix || folded.starts_with(&format!("{prefix}\\"))
        });
        if denied {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("access to {path} is denied"),
            ));
        }
        Ok(())
    }

    fn create_key(&mut self, path: &str) -> &mut StoredKey {
        let trimmed = path.trim_matches('\\');
        let mut prefix = String::new();
        for segment in trimmed.split('\\') {
            if !prefix.is_empty() {
                prefix.push('\\');
            }
            prefix.push_str(segment);
            self.keys
                .entry(fold(&prefix))
                .or_insert_with(|| StoredKey {
                    name: segment.to_string(),
                    values: BTreeMap::new(),
                });
        }
        self.keys.entry(fold(trimmed)).or_default()
    }

    fn children_of(&self, folded: &str) -> Vec<&StoredKey> {
        let prefix = format!("{folded}\\");
        self.keys
            .iter()
            .filter(|(path, _)| {
                path.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('\\'))
            })
            .map(|(_, key)| key)
            .collect()
    }

    fn write_value(&mut self, path: &str, name: &str, value: StoredValue) -> io::Result<()> {
        self.check_writable(path)?;
        self.create_key(path)
            .values
            .insert(name.to_ascii_lowercase(), value);
        Ok(())
    }
}

impl RegistryStore for MemoryStore {
    fn set_string(&mut self, path: &str, name: &str, value: &str) -> io::Result<()> {
        self.write_value(path, name, StoredValue::String(value.to_string()))
    }

    fn set_marker(&mut self, path: &str, name: &str) -> io::Result<()> {
        self.write_value(path, name, StoredValue::Marker)
    }

    fn get_string(&self, path: &str, name: &str) -> io::Result<String> {
        let key = self.keys.get(&fold(path)).ok_or_else(|| not_found(path))?;
        match key.values.get(&name.to_ascii_lowercase()) {
            Some(StoredValue::String(value)) => Ok(value.clone()),
            Some(StoredValue::Marker) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{path}\\{name} is not a string value"),
            )),
            None => Err(not_found(&format!("{path}\\{name}"))),
        }
    }

    fn delete_value(&mut self, path: &str, name: &str) -> io::Result<()> {
        self.check_writable(path)?;
        let key = self
            .keys
            .get_mut(&fold(path))
            .ok_or_else(|| not_found(path))?;
        key.values
            .remove(&name.to_ascii_lowercase())
            .map(|_| ())
            .ok_or_else(|| not_found(&format!("{path}\\{name}")))
    }

    fn subkeys(&self, path: &str) -> io::Result<Vec<String>> {
        let folded = fold(path);
        if !self.keys.contains_key(&folded) {
            return Err(not_found(path));
        }
        Ok(self
            .children_of(&folded)
            .into_iter()
            .map(|key| key.name.clone())
            .collect())
    }

    fn delete_key(&mut self, path: &str) -> io::Result<()> {
        self.check_writable(path)?;
        let folded = fold(path);
        if !self.keys.contains_key(&folded) {
            return Err(not_found(path));
        }
        if self.locked_keys.contains(&folded) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{path} is in use"),
            ));
        }
        if !self.children_of(&folded).is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{path} still has subkeys"),
            ));
        }
        self.keys.remove(&folded);
        Ok(())
    }
}
