//! Parsing and validation of the LaunchBox emulator/platform registry
//! (`Data/Emulators.xml`).

use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use quick_xml::Reader;
use tracing::warn;

use crate::{
    error::ImportError,
    parsers::{collect_text_children, expect_root, next_child, skip_current},
    utils::{canonical, resolve_against},
};

/// Location of the registry, relative to the installation directory.
pub const REGISTRY_RELATIVE_PATH: &str = "Data/Emulators.xml";

/// Directory holding one catalog XML per platform, relative to the
/// installation directory.
pub const PLATFORMS_SUBDIR: &str = "Data/Platforms";

pub type EmulatorId = String;

/// One emulator definition from the registry.
#[derive(Debug)]
pub struct Emulator {
    /// Canonical path of the emulator executable.
    pub app_path: PathBuf,
    /// Default command line parameters, possibly empty.
    pub cmd_params: String,
}

/// One platform definition from the registry.
#[derive(Debug)]
pub struct Platform {
    pub default_emulator_id: EmulatorId,
    /// Display name, also the directory naming key for catalogs and assets.
    pub name: String,
    /// Platform level command line override, possibly empty.
    pub cmd_params: String,
    /// Canonical path of the platform's catalog XML.
    pub xml_path: PathBuf,
}

/// Validated registry contents. Platforms referencing an unknown emulator
/// have already been pruned.
#[derive(Debug, Default)]
pub struct RegistryData {
    pub emulators: HashMap<EmulatorId, Emulator>,
    pub platforms: Vec<Platform>,
}

/// Reads `Data/Emulators.xml` under `root` into validated emulator and
/// platform definitions.
///
/// Incomplete entries (missing id, unresolvable executable, missing catalog
/// file) are dropped one by one; a missing or unreadable registry surfaces as
/// an error the caller downgrades to "nothing importable".
#[tracing::instrument(level = "debug", skip_all)]
pub fn read_registry(root: &Path) -> Result<RegistryData, ImportError> {
    let xml_path = root.join(REGISTRY_RELATIVE_PATH);
    let platforms_dir = root.join(PLATFORMS_SUBDIR);

    let file = File::open(&xml_path)?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    expect_root(&mut reader, &mut buf)?;

    let mut out = RegistryData::default();

    while let Some(tag) = next_child(&mut reader, &mut buf)? {
        match tag.as_str() {
            "Emulator" => {
                let fields = collect_text_children(&mut reader, &tag, &mut buf)?;
                if let Some((id, emulator)) = emulator_from_fields(root, fields) {
                    // assume no id collision
                    out.emulators.insert(id, emulator);
                }
            }
            "EmulatorPlatform" => {
                let fields = collect_text_children(&mut reader, &tag, &mut buf)?;
                if let Some(platform) = platform_from_fields(&platforms_dir, fields) {
                    out.platforms.push(platform);
                }
            }
            _ => skip_current(&mut reader, &tag, &mut buf)?,
        }
    }

    // referential integrity: platforms must point at a known emulator
    out.platforms.retain(|platform| {
        let known = out.emulators.contains_key(&platform.default_emulator_id);
        if !known {
            warn!(
                "platform `{}` refers to a missing emulator id `{}`, entry ignored",
                platform.name, platform.default_emulator_id
            );
        }
        known
    });

    Ok(out)
}

fn emulator_from_fields(
    root: &Path,
    fields: Vec<(String, String)>,
) -> Option<(EmulatorId, Emulator)> {
    let mut id = String::new();
    let mut app_path = None;
    let mut cmd_params = String::new();

    for (tag, value) in fields {
        if value.is_empty() {
            continue;
        }
        match tag.as_str() {
            "ID" => id = value,
            "ApplicationPath" => {
                let resolved = resolve_against(root, &value);
                app_path = canonical(&resolved);
                if app_path.is_none() {
                    warn!(
                        "emulator `{}` doesn't seem to exist, entry ignored",
                        resolved.display()
                    );
                }
            }
            "CommandLine" => cmd_params = value,
            _ => {}
        }
    }

    if id.is_empty() {
        return None;
    }
    let app_path = app_path?;

    Some((id, Emulator { app_path, cmd_params }))
}

fn platform_from_fields(platforms_dir: &Path, fields: Vec<(String, String)>) -> Option<Platform> {
    let mut default_emulator_id = String::new();
    let mut name = String::new();
    let mut cmd_params = String::new();

    for (tag, value) in fields {
        if value.is_empty() {
            continue;
        }
        match tag.as_str() {
            "Emulator" => default_emulator_id = value,
            "Platform" => name = value,
            "CommandLine" => cmd_params = value,
            _ => {}
        }
    }

    if default_emulator_id.is_empty() || name.is_empty() {
        return None;
    }

    // a platform without a readable catalog file is incomplete
    let xml_path = canonical(&platforms_dir.join(format!("{name}.xml")))?;

    Some(Platform {
        default_emulator_id,
        name,
        cmd_params,
        xml_path,
    })
}
