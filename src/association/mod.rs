//! Registers the launcher as a per-user shell handler for a set of file
//! extensions, and removes that registration again.
//!
//! Registry layout under the per-user root, for every extension `<ext>`:
//!
//! ```text
//! Software\Classes\<ext>                        (default) = SlicerLauncher.File
//! Software\Classes\<ext>\OpenWithProgids        SlicerLauncher.File (empty marker)
//! Software\Classes\SlicerLauncher.File          (default), FriendlyTypeName
//!     DefaultIcon                               (default) = <exe>,0
//!     shell\open\command                        (default) = "<exe>" "%1"
//! ...\Explorer\FileExts\<ext>\OpenWithProgids   SlicerLauncher.File (best effort)
//! ```
//!
//! Nothing is cached: every call reads and writes the store directly.

#[cfg(test)]
pub mod memory;
mod report;
mod store;
#[cfg(windows)]
mod windows;

use std::path::Path;

use thiserror::Error;

pub use report::{AssociationResult, BestEffort, ExtensionFailure, UnassociationResult};
pub use store::RegistryStore;
use store::{delete_key_recursive, delete_value_if_present, join_key, read_string_if_present};

pub const HANDLER_IDENTITY: &str = "SlicerLauncher.File";
const HANDLER_DESCRIPTION: &str = "3D Model File for Slicer Launcher";
const HANDLER_FRIENDLY_TYPE_NAME: &str = "3D Model File";

const CLASSES_ROOT: &str = r"Software\Classes";
const EXPLORER_FILE_EXTS: &str = r"Software\Microsoft\Windows\CurrentVersion\Explorer\FileExts";
const OPEN_WITH_PROGIDS: &str = "OpenWithProgids";

#[derive(Debug, Error)]
pub enum AssociationError {
    #[error(
        "File association is currently only supported on Windows.\n\
         On Linux/Mac, please use your system's file association settings."
    )]
    PlatformUnsupported,
}

pub fn system_store() -> Result<Box<dyn RegistryStore>, AssociationError> {
    #[cfg(windows)]
    {
        Ok(Box::new(windows::CurrentUserRegistry::new()))
    }

    #[cfg(not(windows))]
    {
        Err(AssociationError::PlatformUnsupported)
    }
}

pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let bare = trimmed.trim_start_matches('.');
    if bare.is_empty() {
        return None;
    }
    Some(format!(".{bare}"))
}

pub fn normalize_extensions(raw: &[String]) -> (Vec<String>, Vec<ExtensionFailure>) {
    let mut extensions = Vec::<String>::new();
    let mut rejected = Vec::new();
    for entry in raw {
        match normalize_extension(entry) {
            Some(extension) => {
                if !extensions
                    .iter()
                    .any(|seen| seen.eq_ignore_ascii_case(&extension))
                {
                    extensions.push(extension);
                }
            }
            None => rejected.push(ExtensionFailure::new(
                entry.clone(),
                "extension is empty",
            )),
        }
    }
    (extensions, rejected)
}

fn extension_key(extension: &str) -> String {
    join_key(CLASSES_ROOT, extension)
}

fn open_with_key(extension: &str) -> String {
    join_key(&extension_key(extension), OPEN_WITH_PROGIDS)
}

fn recent_handlers_key(extension: &str) -> String {
    join_key(&join_key(EXPLORER_FILE_EXTS, extension), OPEN_WITH_PROGIDS)
}

fn handler_key() -> String {
    join_key(CLASSES_ROOT, HANDLER_IDENTITY)
}

pub fn icon_reference(handler_path: &Path) -> String {
    format!("{},0", handler_path.display())
}

pub fn command_template(handler_path: &Path) -> String {
    format!("\"{}\" \"%1\"", handler_path.display())
}

pub struct AssociationManager<'a> {
    store: &'a mut dyn RegistryStore,
}

impl<'a> AssociationManager<'a> {
    pub fn new(store: &'a mut dyn RegistryStore) -> Self {
        Self { store }
    }

    pub fn associate(&mut self, extensions: &[String], handler_path: &Path) -> AssociationResult {
        let (extensions, rejected) = normalize_extensions(extensions);
        let icon = icon_reference(handler_path);
        let command = command_template(handler_path);
        let mut result = AssociationResult {
            succeeded: Vec::new(),
            failed: rejected,
        };

        for extension in extensions {
            match self.associate_extension(&extension, &icon, &command) {
                Ok(recent) => {
                    match recent {
                        BestEffort::Applied => {}
                        BestEffort::NotApplicable => log::debug!(
                            "No per-user recent handler list for {extension}, skipped"
                        ),
                        BestEffort::Failed(reason) => log::info!(
                            "Could not add {HANDLER_IDENTITY} to recent handlers for {extension}: {reason}"
                        ),
                    }
                    log::info!("Associated {extension} with {HANDLER_IDENTITY}");
                    result.succeeded.push(extension);
                }
                Err(reason) => {
                    log::warn!("Failed to associate {extension}: {reason}");
                    result.failed.push(ExtensionFailure::new(extension, reason));
                }
            }
        }

        result
    }

    fn associate_extension(
        &mut self,
        extension: &str,
        icon: &str,
        command: &str,
    ) -> Result<BestEffort, String> {
        let ext_key = extension_key(extension);
        if let Ok(Some(previous)) = read_string_if_present(&*self.store, &ext_key, "") {
            if !previous.is_empty() && previous != HANDLER_IDENTITY {
                log::warn!("Replacing default handler {previous} for {extension}");
            }
        }

        // Descriptor and open-with entry go first so a failure never leaves
        // the default pointing at a half-written handler.
        let handler = handler_key();
        self.write_string(&handler, "", HANDLER_DESCRIPTION)?;
        self.write_string(&handler, "FriendlyTypeName", HANDLER_FRIENDLY_TYPE_NAME)?;
        self.write_string(&join_key(&handler, "DefaultIcon"), "", icon)?;
        self.write_string(&join_key(&handler, r"shell\open\command"), "", command)?;

        let open_with = open_with_key(extension);
        self.store
            .set_marker(&open_with, HANDLER_IDENTITY)
            .map_err(|err| format!("Failed to write registry key {open_with}: {err}"))?;

        self.write_string(&ext_key, "", HANDLER_IDENTITY)?;

        Ok(self.add_to_recent_handlers(extension))
    }

    fn write_string(&mut self, path: &str, name: &str, value: &str) -> Result<(), String> {
        self.store
            .set_string(path, name, value)
            .map_err(|err| format!("Failed to write registry key {path}: {err}"))
    }

    fn add_to_recent_handlers(&mut self, extension: &str) -> BestEffort {
        match self.store.key_exists(EXPLORER_FILE_EXTS) {
            Ok(true) => {}
            Ok(false) => return BestEffort::NotApplicable,
            Err(err) => return BestEffort::Failed(err.to_string()),
        }
        match self
            .store
            .set_marker(&recent_handlers_key(extension), HANDLER_IDENTITY)
        {
            Ok(()) => BestEffort::Applied,
            Err(err) => BestEffort::Failed(err.to_string()),
        }
    }

    pub fn unassociate(&mut self, extensions: &[String]) -> UnassociationResult {
        let (extensions, rejected) = normalize_extensions(extensions);
        let mut result = UnassociationResult {
            removed: Vec::new(),
            failed: rejected,
        };

        for extension in extensions {
            let (cleared, outcome) = self.unassociate_extension(&extension);
            if cleared {
                log::info!("Removed {HANDLER_IDENTITY} as default for {extension}");
                result.removed.push(extension.clone());
            } else {
                log::debug!("{extension} was not associated with {HANDLER_IDENTITY}");
            }
            if let Err(reason) = outcome {
                log::warn!("Failed to unassociate {extension}: {reason}");
                result.failed.push(ExtensionFailure::new(extension, reason));
            }
        }

        delete_key_recursive(&mut *self.store, &handler_key());
        result
    }

    // Reports whether the default was cleared even when a later step fails.
    fn unassociate_extension(&mut self, extension: &str) -> (bool, Result<(), String>) {
        let ext_key = extension_key(extension);
        let current = match read_string_if_present(&*self.store, &ext_key, "") {
            Ok(current) => current,
            Err(err) => {
                return (
                    false,
                    Err(format!("Failed to read registry key {ext_key}: {err}")),
                )
            }
        };

        let cleared = if current.as_deref() == Some(HANDLER_IDENTITY) {
            match self.remove_value(&ext_key, "") {
                Ok(cleared) => cleared,
                Err(reason) => return (false, Err(reason)),
            }
        } else {
            false
        };

        if let Err(reason) = self.remove_value(&open_with_key(extension), HANDLER_IDENTITY) {
            return (cleared, Err(reason));
        }

        match self.remove_from_recent_handlers(extension) {
            BestEffort::Applied | BestEffort::NotApplicable => {}
            BestEffort::Failed(reason) => log::info!(
                "Could not remove {HANDLER_IDENTITY} from recent handlers for {extension}: {reason}"
            ),
        }

        (cleared, Ok(()))
    }

    fn remove_from_recent_handlers(&mut self, extension: &str) -> BestEffort {
        match delete_value_if_present(
            &mut *self.store,
            &recent_handlers_key(extension),
            HANDLER_IDENTITY,
        ) {
            Ok(true) => BestEffort::Applied,
            Ok(false) => BestEffort::NotApplicable,
            Err(err) => BestEffort::Failed(err.to_string()),
        }
    }

    fn remove_value(&mut self, path: &str, name: &str) -> Result<bool, String> {
        delete_value_if_present(&mut *self.store, path, name)
            .map_err(|err| format!("Failed to update registry key {path}: {err}"))
    }
}
