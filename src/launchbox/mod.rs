//! Importer for LaunchBox libraries.
//!
//! A LaunchBox installation keeps an emulator/platform registry at
//! `Data/Emulators.xml`, one catalog XML per platform under
//! `Data/Platforms/`, and loose media assets under `Images/`, `Music/` and
//! `Videos/`. The importer validates the registry, then imports each valid
//! platform's games and matches its assets, platform by platform.

pub mod assets;
pub mod catalog;
pub mod registry;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{
    data::{ImportSource, SearchContext},
    macros::logs::debug_path,
    utils::some_if_dir,
};

const PROVIDER: &str = "LaunchBox";

/// Directory name probed under the home directory when no explicit
/// installation directory is configured.
const DEFAULT_INSTALL_DIR_NAME: &str = "LaunchBox";

/// Imports games from a LaunchBox installation into a shared
/// [`SearchContext`].
#[derive(Debug)]
pub struct LaunchboxImporter {
    path_install_dir: Option<PathBuf>,
}

impl LaunchboxImporter {
    /// Importer probing the default install location, `~/LaunchBox/`.
    pub fn new() -> Self {
        let Some(path_default) = dirs::home_dir().map(|home| home.join(DEFAULT_INSTALL_DIR_NAME))
        else {
            warn!("{PROVIDER} - no valid home directory found for the current user");
            return Self {
                path_install_dir: None,
            };
        };
        debug_path!("default installation directory", path_default);

        Self {
            path_install_dir: some_if_dir(path_default),
        }
    }

    /// Importer for an explicitly configured installation directory (the
    /// `installdir` option). A nonexistent directory behaves like no
    /// installation at all.
    pub fn with_install_dir(path: PathBuf) -> Self {
        debug_path!("configured installation directory", path);
        Self {
            path_install_dir: some_if_dir(path),
        }
    }
}

impl Default for LaunchboxImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSource for LaunchboxImporter {
    fn is_detected(&self) -> bool {
        self.path_install_dir.as_deref().is_some_and(Path::is_dir)
    }

    #[tracing::instrument(skip(ctx))]
    fn scan(&self, ctx: &mut SearchContext) {
        let Some(root) = self.path_install_dir.as_deref() else {
            info!("{PROVIDER} - no installation found");
            return;
        };
        info!("{PROVIDER} - scanning `{}`", root.display());

        let registry = match registry::read_registry(root) {
            Ok(registry) => registry,
            Err(e) => {
                warn!("{PROVIDER} - could not read the emulator registry: {e}");
                return;
            }
        };
        if registry.emulators.is_empty() {
            warn!("{PROVIDER} - no emulator settings found");
            return;
        }
        if registry.platforms.is_empty() {
            warn!("{PROVIDER} - no platforms found");
            return;
        }

        for platform in &registry.platforms {
            if let Err(e) = catalog::process_platform_xml(root, platform, &registry.emulators, ctx)
            {
                warn!(
                    "{PROVIDER} - could not import platform `{}`: {e}",
                    platform.name
                );
            }
            // games stored before a parse failure can still receive assets
            assets::find_assets(root, platform, ctx);
        }
    }
}
