use std::{
    collections::HashMap,
    fmt::Debug,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::Serialize;

/// Identifier of a [`Game`] within one [`SearchContext`].
pub type GameId = usize;

/// Fixed category tags under which matched media files are stored on a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum AssetType {
    BoxFront,
    BoxBack,
    Marquee,
    Cartridge,
    Screenshot,
    Poster,
    ControlPanel,
    Logo,
    Background,
    SteamGrid,
    Music,
    Video,
}

/// A launchable file belonging to a game, with an optional display name
/// (e.g. an alternate disc or game mode).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GameFile {
    pub path: PathBuf,
    pub name: Option<String>,
}

impl GameFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path, name: None }
    }
}

/// Media files associated with a game, at most one per [`AssetType`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GameAssets(HashMap<AssetType, PathBuf>);

impl GameAssets {
    /// Attaches `path` under `asset_type` unless that type already holds a
    /// file. First match wins; later candidates are ignored.
    pub fn add_file_maybe(&mut self, asset_type: AssetType, path: PathBuf) {
        self.0.entry(asset_type).or_insert(path);
    }

    pub fn get(&self, asset_type: AssetType) -> Option<&Path> {
        self.0.get(&asset_type).map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A single imported game record.
///
/// Created on the first encounter of its canonical source path and enriched
/// in place as further catalog entries and asset files reference that path.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Game {
    pub title: String,
    pub description: String,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub genres: Vec<String>,
    pub release_date: Option<NaiveDate>,
    /// `0.0..=1.0`, with `0.0` meaning "not rated".
    pub rating: f32,
    pub launch_command: String,
    pub launch_workdir: Option<PathBuf>,
    /// Launchable files: the source file first, additional applications after.
    pub files: Vec<GameFile>,
    pub assets: GameAssets,
}

impl Game {
    /// A fresh game record for a source file. The title defaults to the file
    /// stem until a catalog `Title` field overwrites it.
    pub fn from_file(path: PathBuf) -> Self {
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            title,
            description: String::new(),
            developers: Vec::new(),
            publishers: Vec::new(),
            genres: Vec::new(),
            release_date: None,
            rating: 0.0,
            launch_command: String::new(),
            launch_workdir: None,
            files: vec![GameFile::new(path)],
            assets: GameAssets::default(),
        }
    }
}

/// The games belonging to one platform, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Collection {
    pub name: String,
    pub game_ids: Vec<GameId>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            game_ids: Vec::new(),
        }
    }
}

/// Shared accumulator for one multi-source library scan.
///
/// The caller owns it for the whole scan; each import source borrows it
/// mutably for the duration of its own pass. A game's identity is its
/// canonical source path: `path_to_game_id` guarantees that every reference
/// to the same file resolves to the same record, no matter which source or
/// platform it came from.
#[derive(Debug, Default)]
pub struct SearchContext {
    pub games: HashMap<GameId, Game>,
    /// The dedup index: canonical source path to game id.
    pub path_to_game_id: HashMap<PathBuf, GameId>,
    /// Platform name to collection, created lazily on first game insertion.
    pub collections: HashMap<String, Collection>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collection for `name`, created empty when not seen before.
    pub fn collection_mut(&mut self, name: &str) -> &mut Collection {
        self.collections
            .entry(name.to_owned())
            .or_insert_with(|| Collection::new(name))
    }
}

/// An import source scans one external launcher's library and merges what it
/// finds into the shared [`SearchContext`].
///
/// Sources run one at a time against the same context; failures inside a
/// scan degrade to "fewer games found" and are reported through `tracing`
/// rather than returned.
pub trait ImportSource: Debug {
    /// Whether this source's library appears to be present on disk.
    fn is_detected(&self) -> bool;

    /// Runs a full scan, mutating `ctx` in place.
    fn scan(&self, ctx: &mut SearchContext);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assets_first_match_wins() {
        let mut assets = GameAssets::default();
        assets.add_file_maybe(AssetType::BoxFront, PathBuf::from("a.png"));
        assets.add_file_maybe(AssetType::BoxFront, PathBuf::from("b.png"));
        assets.add_file_maybe(AssetType::Video, PathBuf::from("a.mp4"));

        assert_eq!(assets.len(), 2);
        assert_eq!(assets.get(AssetType::BoxFront), Some(Path::new("a.png")));
        assert_eq!(assets.get(AssetType::Video), Some(Path::new("a.mp4")));
    }

    #[test]
    fn test_game_title_defaults_to_file_stem() {
        let game = Game::from_file(PathBuf::from("/roms/Perfect Mission (USA).z64"));
        assert_eq!(game.title, "Perfect Mission (USA)");
        assert_eq!(game.files.len(), 1);
        assert!(game.assets.is_empty());
    }

    #[test]
    fn test_collections_created_lazily() {
        let mut ctx = SearchContext::new();
        assert!(ctx.collections.is_empty());

        ctx.collection_mut("Nintendo 64").game_ids.push(0);
        ctx.collection_mut("Nintendo 64").game_ids.push(1);

        assert_eq!(ctx.collections.len(), 1);
        assert_eq!(ctx.collections["Nintendo 64"].game_ids, vec![0, 1]);
    }
}
