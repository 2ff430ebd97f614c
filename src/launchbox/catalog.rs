//! Parsing of one platform's catalog XML into shared game records.
//!
//! Games are deduplicated by canonical source path through the
//! [`SearchContext`]; additional applications are resolved in a second pass
//! once every game in the document is known, since they may reference
//! entries defined before or after themselves.

use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use chrono::NaiveDate;
use itertools::Itertools;
use quick_xml::Reader;
use tracing::warn;

use crate::{
    data::{Game, GameFile, GameId, SearchContext},
    error::ImportError,
    launchbox::registry::{Emulator, EmulatorId, Platform},
    parsers::{collect_text_children, expect_root, next_child, skip_current},
    utils::{canonical, resolve_against},
};

/// Recognized child elements of a catalog `<Game>` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GameField {
    Id,
    Path,
    Title,
    Release,
    Developer,
    Publisher,
    Notes,
    PlayMode,
    Genre,
    Stars,
    Emulator,
    EmulatorParams,
}

impl GameField {
    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "ID" => Self::Id,
            "ApplicationPath" => Self::Path,
            "Title" => Self::Title,
            "ReleaseDate" => Self::Release,
            "Developer" => Self::Developer,
            "Publisher" => Self::Publisher,
            "Notes" => Self::Notes,
            "PlayMode" => Self::PlayMode,
            "Genre" => Self::Genre,
            "CommunityStarRating" => Self::Stars,
            "Emulator" => Self::Emulator,
            "CommandLine" => Self::EmulatorParams,
            _ => return None,
        })
    }
}

/// Recognized child elements of an `<AdditionalApplication>` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum AdditionalAppField {
    Id,
    GameId,
    Path,
    Name,
}

impl AdditionalAppField {
    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "Id" => Self::Id,
            "GameID" => Self::GameId,
            "ApplicationPath" => Self::Path,
            "Name" => Self::Name,
            _ => return None,
        })
    }
}

/// Parses `platform`'s catalog file, creating or enriching game records in
/// `ctx`.
#[tracing::instrument(level = "debug", skip_all, fields(platform = %platform.name))]
pub fn process_platform_xml(
    root: &Path,
    platform: &Platform,
    emulators: &HashMap<EmulatorId, Emulator>,
    ctx: &mut SearchContext,
) -> Result<(), ImportError> {
    let file = File::open(&platform.xml_path)?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    expect_root(&mut reader, &mut buf)?;

    // additional applications are handled after all games have been found
    let mut additional_apps = Vec::new();
    // catalog-local game id -> shared game id, for resolving GameID refs
    let mut local_game_ids: HashMap<String, GameId> = HashMap::new();

    while let Some(tag) = next_child(&mut reader, &mut buf)? {
        match tag.as_str() {
            "Game" => {
                let fields =
                    field_map(collect_text_children(&mut reader, &tag, &mut buf)?, GameField::from_tag);
                store_game(root, platform, fields, emulators, ctx, &mut local_game_ids);
            }
            "AdditionalApplication" => {
                additional_apps.push(field_map(
                    collect_text_children(&mut reader, &tag, &mut buf)?,
                    AdditionalAppField::from_tag,
                ));
            }
            _ => skip_current(&mut reader, &tag, &mut buf)?,
        }
    }

    for fields in additional_apps {
        store_additional_app(root, &platform.xml_path, fields, &local_game_ids, ctx);
    }

    Ok(())
}

/// Folds raw `(tag, text)` pairs into a field map. Unknown tags and empty
/// values are discarded; for repeated tags the first value wins.
fn field_map<F: Eq + std::hash::Hash>(
    raw: Vec<(String, String)>,
    from_tag: impl Fn(&str) -> Option<F>,
) -> HashMap<F, String> {
    let mut out = HashMap::new();
    for (tag, value) in raw {
        if value.is_empty() {
            continue;
        }
        if let Some(field) = from_tag(&tag) {
            out.entry(field).or_insert(value);
        }
    }
    out
}

/// Validates one `<Game>` entry and creates or reuses the record for its
/// canonical path. Collection membership is appended either way.
fn store_game(
    root: &Path,
    platform: &Platform,
    fields: HashMap<GameField, String>,
    emulators: &HashMap<EmulatorId, Emulator>,
    ctx: &mut SearchContext,
    local_game_ids: &mut HashMap<String, GameId>,
) {
    let xml_path = &platform.xml_path;

    let Some(local_id) = fields.get(&GameField::Id) else {
        warn!("in `{}`, a game has no ID, entry ignored", xml_path.display());
        return;
    };
    let Some(rel_path) = fields.get(&GameField::Path) else {
        warn!(
            "in `{}`, game `{local_id}` has no path, entry ignored",
            xml_path.display()
        );
        return;
    };

    let game_path = resolve_against(root, rel_path);
    let Some(can_path) = canonical(&game_path) else {
        warn!(
            "in `{}`, game file `{rel_path}` doesn't seem to exist, entry ignored",
            xml_path.display()
        );
        return;
    };

    let game_id = match ctx.path_to_game_id.get(&can_path) {
        Some(&existing_id) => existing_id,
        None => {
            let mut game = Game::from_file(game_path);
            merge_game_fields(&mut game, &fields, platform, emulators);
            if game.launch_command.is_empty() {
                warn!("game `{}` has no launch command", game.title);
            }

            let new_id = ctx.games.len();
            ctx.path_to_game_id.insert(can_path, new_id);
            ctx.games.insert(new_id, game);
            new_id
        }
    };

    ctx.collection_mut(&platform.name).game_ids.push(game_id);
    local_game_ids.insert(local_id.clone(), game_id);
}

/// Applies the per-field merge policy to a freshly created game.
///
/// Policies: title last-wins, description and release date first-wins,
/// developers/publishers/genres append-and-dedup, rating monotonic max, and
/// command line params per-game > platform > emulator default.
fn merge_game_fields(
    game: &mut Game,
    fields: &HashMap<GameField, String>,
    platform: &Platform,
    emulators: &HashMap<EmulatorId, Emulator>,
) {
    // effective emulator: the per-game override when it resolves, else the
    // platform default
    let mut emulator = emulators.get(&platform.default_emulator_id);
    if let Some(override_id) = fields.get(&GameField::Emulator) {
        if let Some(overridden) = emulators.get(override_id) {
            emulator = Some(overridden);
        }
    }

    if let Some(title) = fields.get(&GameField::Title) {
        game.title = title.clone();
    }
    if let Some(notes) = fields.get(&GameField::Notes) {
        if game.description.is_empty() {
            game.description = notes.clone();
        }
    }
    if let Some(developer) = fields.get(&GameField::Developer) {
        game.developers.push(developer.clone());
        dedup_keep_first(&mut game.developers);
    }
    if let Some(publisher) = fields.get(&GameField::Publisher) {
        game.publishers.push(publisher.clone());
        dedup_keep_first(&mut game.publishers);
    }
    if let Some(genre) = fields.get(&GameField::Genre) {
        game.genres.push(genre.clone());
    }
    if let Some(play_modes) = fields.get(&GameField::PlayMode) {
        // play modes share the genre bucket
        game.genres.extend(
            play_modes
                .split(';')
                .map(|mode| mode.trim().to_owned())
                .filter(|mode| !mode.is_empty()),
        );
    }
    dedup_keep_first(&mut game.genres);

    if let Some(release) = fields.get(&GameField::Release) {
        if game.release_date.is_none() {
            game.release_date = parse_release_date(release);
        }
    }
    if let Some(stars) = fields.get(&GameField::Stars) {
        if let Ok(value) = stars.parse::<f32>() {
            // monotonic max: lower values never downgrade the stored rating
            if value > game.rating {
                game.rating = value;
            }
        }
    }

    // per-game params beat the platform override, which beats the effective
    // emulator's own defaults
    let params = fields
        .get(&GameField::EmulatorParams)
        .map(String::as_str)
        .or_else(|| (!platform.cmd_params.is_empty()).then_some(platform.cmd_params.as_str()))
        .or(emulator.map(|emu| emu.cmd_params.as_str()))
        .unwrap_or_default();

    if let Some(emulator) = emulator {
        game.launch_command = format!(
            "\"{}\" {params} {{file.path}}",
            emulator.app_path.display()
        );
        game.launch_workdir = emulator.app_path.parent().map(Path::to_owned);
    }
}

fn dedup_keep_first(values: &mut Vec<String>) {
    *values = std::mem::take(values).into_iter().unique().collect();
}

/// LaunchBox writes ISO dates, sometimes with a trailing time component.
fn parse_release_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Validates one `<AdditionalApplication>` entry and attaches it to the game
/// it references as an alternate launch file.
fn store_additional_app(
    root: &Path,
    xml_path: &Path,
    fields: HashMap<AdditionalAppField, String>,
    local_game_ids: &HashMap<String, GameId>,
    ctx: &mut SearchContext,
) {
    let Some(entry_id) = fields.get(&AdditionalAppField::Id) else {
        warn!(
            "in `{}`, an additional application entry has no ID, entry ignored",
            xml_path.display()
        );
        return;
    };
    let Some(local_game_id) = fields.get(&AdditionalAppField::GameId) else {
        warn!(
            "in `{}`, additional application entry `{entry_id}` has no GameID field, entry ignored",
            xml_path.display()
        );
        return;
    };
    let Some(&game_id) = local_game_ids.get(local_game_id) else {
        warn!(
            "in `{}`, additional application entry `{entry_id}` refers to nonexisting game `{local_game_id}`, entry ignored",
            xml_path.display()
        );
        return;
    };
    let Some(rel_path) = fields.get(&AdditionalAppField::Path) else {
        warn!(
            "in `{}`, additional application entry `{entry_id}` has no path, entry ignored",
            xml_path.display()
        );
        return;
    };

    let file_path = resolve_against(root, rel_path);
    let Some(can_path) = canonical(&file_path) else {
        warn!(
            "in `{}`, additional application entry `{entry_id}` refers to nonexisting file `{rel_path}`, entry ignored",
            xml_path.display()
        );
        return;
    };

    let Some(game) = ctx.games.get_mut(&game_id) else {
        return;
    };
    let name = fields.get(&AdditionalAppField::Name).cloned();

    // an entry pointing at an already attached file only contributes its name
    let existing = game
        .files
        .iter_mut()
        .find(|file| canonical(&file.path).is_some_and(|p| p == can_path));
    match existing {
        Some(file) => {
            if name.is_some() {
                file.name = name;
            }
        }
        None => game.files.push(GameFile { path: file_path, name }),
    }

    // other catalog entries referencing this exact file fold into this game
    ctx.path_to_game_id.entry(can_path).or_insert(game_id);
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    fn mock_platform(cmd_params: &str) -> Platform {
        Platform {
            default_emulator_id: "emu-1".to_owned(),
            name: "Nintendo 64".to_owned(),
            cmd_params: cmd_params.to_owned(),
            xml_path: PathBuf::from("/library/Data/Platforms/Nintendo 64.xml"),
        }
    }

    fn mock_emulators() -> HashMap<EmulatorId, Emulator> {
        HashMap::from([
            (
                "emu-1".to_owned(),
                Emulator {
                    app_path: PathBuf::from("/emus/mupen64/mupen64"),
                    cmd_params: "--default".to_owned(),
                },
            ),
            (
                "emu-2".to_owned(),
                Emulator {
                    app_path: PathBuf::from("/emus/ares/ares"),
                    cmd_params: String::new(),
                },
            ),
        ])
    }

    fn merge(game: &mut Game, pairs: &[(GameField, &str)], platform: &Platform) {
        let fields = pairs
            .iter()
            .map(|(field, value)| (*field, (*value).to_owned()))
            .collect();
        merge_game_fields(game, &fields, platform, &mock_emulators());
    }

    #[test]
    fn test_merge_basic_fields() {
        let mut game = Game::from_file(PathBuf::from("/roms/rom.z64"));
        merge(
            &mut game,
            &[
                (GameField::Title, "Perfect Mission"),
                (GameField::Notes, "A mission, perfectly executed."),
                (GameField::Developer, "Rare"),
                (GameField::Publisher, "Nintendo"),
                (GameField::Genre, "Shooter"),
                (GameField::Release, "2000-05-22T00:00:00-07:00"),
            ],
            &mock_platform(""),
        );

        assert_eq!(game.title, "Perfect Mission");
        assert_eq!(game.description, "A mission, perfectly executed.");
        assert_eq!(game.developers, vec!["Rare"]);
        assert_eq!(game.publishers, vec!["Nintendo"]);
        assert_eq!(game.genres, vec!["Shooter"]);
        assert_eq!(
            game.release_date,
            NaiveDate::from_ymd_opt(2000, 5, 22)
        );
    }

    #[test]
    fn test_merge_is_idempotent_for_list_fields() {
        let mut game = Game::from_file(PathBuf::from("/roms/rom.z64"));
        let fields = [
            (GameField::Developer, "Rare"),
            (GameField::Publisher, "Nintendo"),
            (GameField::Genre, "Shooter"),
            (GameField::PlayMode, "Single Player; Co-op"),
        ];
        merge(&mut game, &fields, &mock_platform(""));
        merge(&mut game, &fields, &mock_platform(""));

        assert_eq!(game.developers, vec!["Rare"]);
        assert_eq!(game.publishers, vec!["Nintendo"]);
        assert_eq!(game.genres, vec!["Shooter", "Single Player", "Co-op"]);
    }

    #[test]
    fn test_merge_description_first_wins() {
        let mut game = Game::from_file(PathBuf::from("/roms/rom.z64"));
        merge(&mut game, &[(GameField::Notes, "first")], &mock_platform(""));
        merge(&mut game, &[(GameField::Notes, "second")], &mock_platform(""));
        assert_eq!(game.description, "first");
    }

    #[test]
    fn test_merge_rating_is_monotonic_max() {
        let mut game = Game::from_file(PathBuf::from("/roms/rom.z64"));
        for stars in ["0.5", "0.3", "0.9"] {
            merge(&mut game, &[(GameField::Stars, stars)], &mock_platform(""));
        }
        assert_eq!(game.rating, 0.9);
    }

    #[test]
    fn test_merge_ignores_unparsable_rating() {
        let mut game = Game::from_file(PathBuf::from("/roms/rom.z64"));
        merge(&mut game, &[(GameField::Stars, "five stars")], &mock_platform(""));
        assert_eq!(game.rating, 0.0);
    }

    // params precedence: per-game > platform > emulator default
    #[test_case(&[], "", "--default"; "emulator default")]
    #[test_case(&[], "--n64-mode", "--n64-mode"; "platform override")]
    #[test_case(&[(GameField::EmulatorParams, "--per-game")], "--n64-mode", "--per-game"; "per game override")]
    fn test_merge_params_precedence(
        extra: &[(GameField, &str)],
        platform_params: &str,
        expected: &str,
    ) {
        let mut game = Game::from_file(PathBuf::from("/roms/rom.z64"));
        merge(&mut game, extra, &mock_platform(platform_params));

        assert_eq!(
            game.launch_command,
            format!("\"/emus/mupen64/mupen64\" {expected} {{file.path}}")
        );
        assert_eq!(game.launch_workdir, Some(PathBuf::from("/emus/mupen64")));
    }

    #[test]
    fn test_merge_emulator_override() {
        let mut game = Game::from_file(PathBuf::from("/roms/rom.z64"));
        merge(
            &mut game,
            &[(GameField::Emulator, "emu-2")],
            &mock_platform(""),
        );

        // params fall back to the effective (overridden) emulator's defaults,
        // which are empty here
        assert_eq!(game.launch_command, "\"/emus/ares/ares\"  {file.path}");
        assert_eq!(game.launch_workdir, Some(PathBuf::from("/emus/ares")));
    }

    #[test]
    fn test_merge_unknown_emulator_override_falls_back() {
        let mut game = Game::from_file(PathBuf::from("/roms/rom.z64"));
        merge(
            &mut game,
            &[(GameField::Emulator, "emu-nope")],
            &mock_platform(""),
        );
        assert!(game.launch_command.starts_with("\"/emus/mupen64/mupen64\""));
    }

    #[test_case("2000-05-22", Some((2000, 5, 22)))]
    #[test_case("2000-05-22T00:00:00-07:00", Some((2000, 5, 22)); "with time component")]
    #[test_case("May 22, 2000", None; "non iso")]
    #[test_case("2000-13-01", None; "invalid month")]
    fn test_parse_release_date(value: &str, expected: Option<(i32, u32, u32)>) {
        assert_eq!(
            parse_release_date(value),
            expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        );
    }

    #[test]
    fn test_field_map_first_value_wins_and_drops_unknown() {
        let raw = vec![
            ("Title".to_owned(), "First".to_owned()),
            ("Title".to_owned(), "Second".to_owned()),
            ("UnknownTag".to_owned(), "x".to_owned()),
            ("Notes".to_owned(), String::new()),
        ];
        let fields = field_map(raw, GameField::from_tag);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[&GameField::Title], "First");
    }
}
