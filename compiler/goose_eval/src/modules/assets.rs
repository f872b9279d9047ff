//! Standard library sources compiled into the binary.

const ASSETS: &[(&str, &str)] = &[
    ("fs.goose", include_str!("std/fs.goose")),
    ("json.goose", include_str!("std/json.goose")),
    ("math.goose", include_str!("std/math.goose")),
    ("platform.goose", include_str!("std/platform.goose")),
];

/// Asset for a `std:` path: `PATH` if it names a file, otherwise
/// `PATH.goose`, then `PATH/index.goose`. Returns the asset path and its
/// text.
pub(crate) fn lookup(path: &str) -> Option<(&'static str, &'static str)> {
    let path = path.trim_start_matches("./").trim_end_matches('/');
    let candidates = if path.ends_with(".goose") {
        vec![path.to_string()]
    } else {
        vec![format!("{path}.goose"), format!("{path}/index.goose")]
    };
    candidates
        .iter()
        .find_map(|candidate| ASSETS.iter().find(|(name, _)| name == candidate).copied())
}

/// Directory part of an asset path, empty for top-level assets.
pub(crate) fn dir_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// `relative` joined onto the asset directory `dir`, with `.` and `..`
/// segments folded. `None` if it climbs above the asset root.
pub(crate) fn join_relative(dir: &str, relative: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|part| !part.is_empty()).collect();
    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            name => parts.push(name),
        }
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_tries_extension_then_index() {
        assert_eq!(lookup("math").map(|(name, _)| name), Some("math.goose"));
        assert_eq!(lookup("json.goose").map(|(name, _)| name), Some("json.goose"));
        assert_eq!(lookup("nope").map(|(name, _)| name), None);
    }

    #[test]
    fn relative_paths_stay_inside_the_table() {
        assert_eq!(join_relative("", "./math"), Some("math".to_string()));
        assert_eq!(join_relative("json", "../math.goose"), Some("math.goose".to_string()));
        assert_eq!(join_relative("a/b", "./c/../d"), Some("a/b/d".to_string()));
        assert_eq!(join_relative("", "../escape"), None);
        assert_eq!(dir_of("json/index.goose"), "json");
        assert_eq!(dir_of("math.goose"), "");
    }
}
