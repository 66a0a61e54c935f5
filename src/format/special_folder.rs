//! Well-known folders that backup path templates may reference
//!
//! `{ApplicationData}/logs/{FileBody}{Index:\.000}{Extension}` places backups
//! under the per-user configuration directory. Folders are resolved once,
//! when the template is compiled.

use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialFolder {
    ApplicationData,
    CommonApplicationData,
    CommonDesktopDirectory,
    CommonDocuments,
    Desktop,
    DesktopDirectory,
    LocalApplicationData,
    MyDocuments,
    Personal,
    UserProfile,
}

impl SpecialFolder {
    pub const ALL: [SpecialFolder; 10] = [
        SpecialFolder::ApplicationData,
        SpecialFolder::CommonApplicationData,
        SpecialFolder::CommonDesktopDirectory,
        SpecialFolder::CommonDocuments,
        SpecialFolder::Desktop,
        SpecialFolder::DesktopDirectory,
        SpecialFolder::LocalApplicationData,
        SpecialFolder::MyDocuments,
        SpecialFolder::Personal,
        SpecialFolder::UserProfile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SpecialFolder::ApplicationData => "ApplicationData",
            SpecialFolder::CommonApplicationData => "CommonApplicationData",
            SpecialFolder::CommonDesktopDirectory => "CommonDesktopDirectory",
            SpecialFolder::CommonDocuments => "CommonDocuments",
            SpecialFolder::Desktop => "Desktop",
            SpecialFolder::DesktopDirectory => "DesktopDirectory",
            SpecialFolder::LocalApplicationData => "LocalApplicationData",
            SpecialFolder::MyDocuments => "MyDocuments",
            SpecialFolder::Personal => "Personal",
            SpecialFolder::UserProfile => "UserProfile",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|folder| folder.name() == name)
    }
}

/// Maps special folders to absolute paths
pub trait FolderResolver: Send + Sync {
    /// `None` when the folder does not exist on this platform
    fn resolve(&self, folder: SpecialFolder) -> Option<PathBuf>;
}

/// Resolves folders from the running user's environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFolders;

impl FolderResolver for SystemFolders {
    fn resolve(&self, folder: SpecialFolder) -> Option<PathBuf> {
        match folder {
            SpecialFolder::ApplicationData => dirs::config_dir(),
            SpecialFolder::LocalApplicationData => dirs::data_local_dir(),
            SpecialFolder::Desktop | SpecialFolder::DesktopDirectory => dirs::desktop_dir(),
            SpecialFolder::MyDocuments | SpecialFolder::Personal => {
                dirs::document_dir().or_else(dirs::home_dir)
            }
            SpecialFolder::UserProfile => dirs::home_dir(),
            SpecialFolder::CommonApplicationData => common_application_data(),
            SpecialFolder::CommonDesktopDirectory => public_folder("Desktop"),
            SpecialFolder::CommonDocuments => public_folder("Documents"),
        }
    }
}

#[cfg(windows)]
fn common_application_data() -> Option<PathBuf> {
    std::env::var_os("ProgramData").map(PathBuf::from)
}

#[cfg(not(windows))]
fn common_application_data() -> Option<PathBuf> {
    Some(PathBuf::from("/usr/share"))
}

#[cfg(windows)]
fn public_folder(name: &str) -> Option<PathBuf> {
    std::env::var_os("PUBLIC").map(|public| PathBuf::from(public).join(name))
}

#[cfg(not(windows))]
fn public_folder(_name: &str) -> Option<PathBuf> {
    None
}

/// A fixed folder table, for tests and sandboxed deployments
#[derive(Debug, Clone, Default)]
pub struct FolderMap {
    folders: HashMap<SpecialFolder, PathBuf>,
}

impl FolderMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, folder: SpecialFolder, path: impl Into<PathBuf>) -> Self {
        self.folders.insert(folder, path.into());
        self
    }
}

impl FolderResolver for FolderMap {
    fn resolve(&self, folder: SpecialFolder) -> Option<PathBuf> {
        self.folders.get(&folder).cloned()
    }
}
