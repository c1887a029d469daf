use heapless::{String, Vec};

use crate::keyboard::{Profile, Profiles, MAX_PROFILES};
use crate::storage::{LineReader, Storage};

use super::keyspec::resolve;
use super::parser::{classify, parse_note, strip_inline_comment, Line};
use super::settings::{apply_profile_setting, Config};

pub const CONFIG_FILE_NAME: &str = "CONFIG.TXT";

const MAPPING_NAME_TOKEN: &str = "MAPPINGS";
const MAPPING_EXTENSION: &str = ".TXT";
const METADATA_PREFIX: &str = "._";

type FileName = String<64>;

/// Reads the global config and every mapping profile off the card in one
/// pass. Never fails: missing or unreadable pieces fall back to defaults
/// and the built-in profile.
pub fn load<S: Storage>(storage: &mut S) -> (Config, Profiles) {
    let config = load_config(storage);
    let profiles = load_profiles(storage, &config);
    (config, profiles)
}

pub fn load_config<S: Storage>(storage: &mut S) -> Config {
    let mut config = Config::default();
    let Ok(file) = storage.open(CONFIG_FILE_NAME) else {
        return config;
    };
    let mut lines = LineReader::new(file);
    while let Some(line) = lines.next_line() {
        if let Line::Pair { key, value } = classify(line) {
            config.apply(key, value);
        }
    }
    config
}

pub fn load_profiles<S: Storage>(storage: &mut S, config: &Config) -> Profiles {
    let names = mapping_file_names(storage);
    let mut profiles: Vec<Profile, MAX_PROFILES> = Vec::new();
    for name in &names {
        let _ = profiles.push(load_profile(storage, name, config));
    }
    info!("loaded {} mapping profile(s)", profiles.len());
    Profiles::new(profiles, config)
}

/// Root-directory entries whose name contains "MAPPINGS" (any case) and
/// carries the .TXT extension, skipping macOS metadata droppings. The first
/// eight win.
fn mapping_file_names<S: Storage>(storage: &mut S) -> Vec<FileName, MAX_PROFILES> {
    let mut names: Vec<FileName, MAX_PROFILES> = Vec::new();
    let listed = storage.list_root(|entry| {
        if names.is_full() || !is_mapping_file_name(entry) {
            return;
        }
        let mut name = FileName::new();
        if name.push_str(entry).is_err() {
            return;
        }
        let _ = names.push(name);
    });
    if listed.is_err() {
        warn!("root listing failed, no mapping files");
    }
    names
}

fn is_mapping_file_name(name: &str) -> bool {
    !name.starts_with(METADATA_PREFIX)
        && contains_ignore_ascii_case(name, MAPPING_NAME_TOKEN)
        && ends_with_ignore_ascii_case(name, MAPPING_EXTENSION)
}

fn load_profile<S: Storage>(storage: &mut S, file_name: &str, config: &Config) -> Profile {
    let mut profile = Profile::new(profile_name(file_name), config);
    let Ok(file) = storage.open(file_name) else {
        warn!("mapping file vanished between listing and open");
        return profile;
    };

    let mut lines = LineReader::new(file);
    let mut installed: usize = 0;
    while let Some(line) = lines.next_line() {
        let Line::Pair { key, value } = classify(line) else {
            continue;
        };
        if apply_profile_setting(&mut profile, key, value) {
            continue;
        }
        let Some(note) = parse_note(key) else {
            continue;
        };
        let Some(mapping) = resolve(strip_inline_comment(value)) else {
            continue;
        };
        profile.set_mapping(note, mapping);
        installed += 1;
    }

    profile.is_valid = installed > 0;
    profile
}

fn profile_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    if needle.len() > haystack.len() {
        return false;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

fn ends_with_ignore_ascii_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.as_bytes()[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}
