use std::io;

use winreg::enums::{RegType, HKEY_CURRENT_USER, KEY_READ, KEY_WRITE};
use winreg::{RegKey, RegValue};

use super::store::RegistryStore;

pub struct CurrentUserRegistry {
    root: RegKey,
}

impl CurrentUserRegistry {
    pub fn new() -> Self {
        Self {
            root: RegKey::predef(HKEY_CURRENT_USER),
        }
    }
}

impl Default for CurrentUserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStore for CurrentUserRegistry {
    fn set_string(&mut self, path: &str, name: &str, value: &str) -> io::Result<()> {
        let (key, _) = self.root.create_subkey(path)?;
        key.set_value(name, &value)
    }

    fn set_marker(&mut self, path: &str, name: &str) -> io::Result<()> {
        let (key, _) = self.root.create_subkey(path)?;
        key.set_raw_value(
            name,
            &RegValue {
                bytes: Vec::new(),
                vtype: RegType::REG_NONE,
            },
        )
    }

    fn get_string(&self, path: &str, name: &str) -> io::Result<String> {
        self.root
            .open_subkey_with_flags(path, KEY_READ)?
            .get_value::<String, _>(name)
    }

    fn delete_value(&mut self, path: &str, name: &str) -> io::Result<()> {
        self.root
            .open_subkey_with_flags(path, KEY_READ | KEY_WRITE)?
            .delete_value(name)
    }

    fn subkeys(&self, path: &str) -> io::Result<Vec<String>> {
        self.root
            .open_subkey_with_flags(path, KEY_READ)?
            .enum_keys()
            .collect()
    }

    fn delete_key(&mut self, path: &str) -> io::Result<()> {
        self.root.delete_subkey(path)
    }
}
