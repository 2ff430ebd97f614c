//! Heuristic association of loose image, music and video files with games
//! already imported for a platform.
//!
//! Nothing forces asset files to reference games: the only contract is the
//! LaunchBox convention of naming files after (escaped) game titles. Files
//! that match no title are skipped silently rather than guessed at.

use std::{collections::HashMap, path::Path};

use tracing::trace;
use walkdir::WalkDir;

use crate::{
    data::{AssetType, GameId, SearchContext},
    launchbox::registry::Platform,
    utils::{
        dashes_to_colons, escape_title, move_article_to_front, strip_numeric_suffix,
        strip_trailing_parenthetical,
    },
};

/// Image subdirectories recognized under `Images/<platform>/`, ordered by
/// priority: when several directories map to the same asset type, files from
/// earlier ones win.
const ASSET_DIRS: &[(&str, AssetType)] = &[
    ("Box - Front", AssetType::BoxFront),
    ("Box - Front - Reconstructed", AssetType::BoxFront),
    ("Fanart - Box - Front", AssetType::BoxFront),
    ("Box - Back", AssetType::BoxBack),
    ("Box - Back - Reconstructed", AssetType::BoxBack),
    ("Fanart - Box - Back", AssetType::BoxBack),
    ("Arcade - Marquee", AssetType::Marquee),
    ("Banner", AssetType::Marquee),
    ("Cart - Front", AssetType::Cartridge),
    ("Disc", AssetType::Cartridge),
    ("Fanart - Cart - Front", AssetType::Cartridge),
    ("Fanart - Disc", AssetType::Cartridge),
    ("Screenshot - Gameplay", AssetType::Screenshot),
    ("Screenshot - Game Select", AssetType::Screenshot),
    ("Screenshot - Game Title", AssetType::Screenshot),
    ("Screenshot - Game Over", AssetType::Screenshot),
    ("Screenshot - High Scores", AssetType::Screenshot),
    ("Advertisement Flyer - Front", AssetType::Poster),
    ("Arcade - Control Panel", AssetType::ControlPanel),
    ("Clear Logo", AssetType::Logo),
    ("Fanart - Background", AssetType::Background),
    ("Steam Banner", AssetType::SteamGrid),
];

/// Walks the platform's asset directories and attaches matching files to the
/// games in its collection. Nonexistent directories count as zero matches.
#[tracing::instrument(level = "debug", skip_all, fields(platform = %platform.name))]
pub fn find_assets(root: &Path, platform: &Platform, ctx: &mut SearchContext) {
    let Some(collection) = ctx.collections.get(&platform.name) else {
        return;
    };
    let member_ids = collection.game_ids.clone();

    {
        // image and music files follow filesystem-safe naming
        let escaped_titles = build_title_map(&member_ids, ctx, true);

        let images_root = root.join("Images").join(&platform.name);
        for &(subdir, asset_type) in ASSET_DIRS {
            find_assets_in(&images_root.join(subdir), asset_type, true, &escaped_titles, ctx);
        }

        let music_root = root.join("Music").join(&platform.name);
        find_assets_in(&music_root, AssetType::Music, false, &escaped_titles, ctx);
    }

    // video files are matched against raw titles, with laxer heuristics
    let raw_titles = build_title_map(&member_ids, ctx, false);
    let videos_root = root.join("Videos").join(&platform.name);
    find_videos_in(&videos_root, &raw_titles, ctx);
}

/// Exact-match title lookup for one collection, rebuilt fresh per pass.
/// Key collisions resolve to the later game (last write wins).
fn build_title_map(
    member_ids: &[GameId],
    ctx: &SearchContext,
    escaped: bool,
) -> HashMap<String, GameId> {
    let mut out = HashMap::new();
    for &game_id in member_ids {
        if let Some(game) = ctx.games.get(&game_id) {
            let title = if escaped {
                escape_title(&game.title)
            } else {
                game.title.clone()
            };
            out.insert(title, game_id);
        }
    }
    out
}

fn find_assets_in(
    dir: &Path,
    asset_type: AssetType,
    has_numeric_suffix: bool,
    titles: &HashMap<String, GameId>,
    ctx: &mut SearchContext,
) {
    for entry in WalkDir::new(dir).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(stem) = entry.path().file_stem().map(|s| s.to_string_lossy()) else {
            continue;
        };

        let game_title = if has_numeric_suffix {
            strip_numeric_suffix(&stem)
        } else {
            stem.as_ref()
        };
        let Some(&game_id) = titles.get(game_title) else {
            continue;
        };

        if let Some(game) = ctx.games.get_mut(&game_id) {
            trace!(
                "matched `{}` as {asset_type:?} for `{}`",
                entry.path().display(),
                game.title
            );
            game.assets.add_file_maybe(asset_type, entry.path().to_owned());
        }
    }
}

fn find_videos_in(dir: &Path, titles: &HashMap<String, GameId>, ctx: &mut SearchContext) {
    for entry in WalkDir::new(dir).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(stem) = entry.path().file_stem().map(|s| s.to_string_lossy()) else {
            continue;
        };

        let game_title = strip_trailing_parenthetical(&stem);

        // one retry with the common title rewrites, then give up silently
        let game_id = titles.get(game_title).copied().or_else(|| {
            let normalized = move_article_to_front(&dashes_to_colons(game_title));
            titles.get(&normalized).copied()
        });
        let Some(game_id) = game_id else {
            continue;
        };

        if let Some(game) = ctx.games.get_mut(&game_id) {
            trace!(
                "matched `{}` as video for `{}`",
                entry.path().display(),
                game.title
            );
            game.assets.add_file_maybe(AssetType::Video, entry.path().to_owned());
        }
    }
}
