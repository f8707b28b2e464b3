use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;

/// Light/dark classification of a theme, cycled with a dedicated key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeTag {
    #[default]
    Unset,
    Light,
    Dark,
}

impl ModeTag {
    /// Next tag in the ring `unset -> light -> dark -> unset`.
    pub fn next(self) -> Self {
        match self {
            ModeTag::Unset => ModeTag::Light,
            ModeTag::Light => ModeTag::Dark,
            ModeTag::Dark => ModeTag::Unset,
        }
    }

    pub fn is_unset(&self) -> bool {
        *self == ModeTag::Unset
    }

    pub fn glyph(self) -> char {
        match self {
            ModeTag::Unset => ' ',
            ModeTag::Light => 'L',
            ModeTag::Dark => 'D',
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationRecord {
    pub pinned: bool,
    pub comment: String,
    #[serde(rename = "theme_mode", skip_serializing_if = "ModeTag::is_unset")]
    pub mode_tag: ModeTag,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    properties: BTreeMap<String, AnnotationRecord>,
}

/// Item name to annotation mapping, backed by one TOML file.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    records: BTreeMap<String, AnnotationRecord>,
}

impl AnnotationStore {
    /// Loads the store. A missing file is an empty store; anything unparsable is an error.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "annotation store not found, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let parsed: StoreFile = toml::from_str(&data).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            entries = parsed.properties.len(),
            "annotation store loaded"
        );
        Ok(Self {
            records: parsed.properties,
        })
    }

    /// Rewrites the whole store through a temp file and a rename.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let file = StoreFile {
            properties: self.records.clone(),
        };
        let data = toml::to_string_pretty(&file)?;
        write_atomic(path, data.as_bytes()).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), entries = self.records.len(), "annotation store saved");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&AnnotationRecord> {
        self.records.get(name)
    }

    pub fn get_or_create(&mut self, name: &str) -> &mut AnnotationRecord {
        self.records.entry(name.to_string()).or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    // Replace the link target, not the link itself.
    let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let path = resolved.as_path();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    let mut file = fs::File::create(temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> std::path::PathBuf {
        dir.path().join("selector-config.toml")
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = AnnotationStore::load(&store_path(&dir)).unwrap();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        fs::write(&path, "[properties.\"latte\"\npinned = yes").unwrap();

        let err = AnnotationStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn wrong_field_type_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        fs::write(&path, "[properties.latte]\npinned = \"sometimes\"\n").unwrap();

        assert!(matches!(
            AnnotationStore::load(&path),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn save_then_load_round_trips_annotations() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = AnnotationStore::default();
        store.get_or_create("latte").comment = "warm".into();
        store.get_or_create("mocha").pinned = true;
        store.get_or_create("frappe.toml").mode_tag = ModeTag::Dark;
        store.save(&path).unwrap();

        let loaded = AnnotationStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.get("latte").unwrap().comment, "warm");
        assert!(loaded.get("mocha").unwrap().pinned);
        assert_eq!(loaded.get("frappe.toml").unwrap().mode_tag, ModeTag::Dark);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn save_writes_through_symlink() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("dotfiles-selector.toml");
        let link = store_path(&dir);
        fs::write(&target, "").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let mut store = AnnotationStore::load(&link).unwrap();
        store.get_or_create("latte").pinned = true;
        store.save(&link).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert!(fs::read_to_string(&target).unwrap().contains("pinned = true"));
        assert!(AnnotationStore::load(&link).unwrap().get("latte").unwrap().pinned);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config").join("store.toml");

        let mut store = AnnotationStore::default();
        store.get_or_create("latte").pinned = true;
        store.save(&path).unwrap();

        assert!(AnnotationStore::load(&path).unwrap().get("latte").unwrap().pinned);
    }

    #[test]
    fn legacy_document_with_unset_mode_and_unknown_keys_loads() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        fs::write(
            &path,
            r#"
version = 3

[properties.latte]
pinned = false
comment = ""
theme_mode = "unset"

[properties."gruvbox_light.toml"]
pinned = true
theme_mode = "light"
colour = "ignored"
"#,
        )
        .unwrap();

        let store = AnnotationStore::load(&path).unwrap();
        assert_eq!(store.get("latte"), Some(&AnnotationRecord::default()));
        let gruvbox = store.get("gruvbox_light.toml").unwrap();
        assert!(gruvbox.pinned);
        assert_eq!(gruvbox.comment, "");
        assert_eq!(gruvbox.mode_tag, ModeTag::Light);
    }

    #[test]
    fn unset_mode_is_omitted_on_write() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = AnnotationStore::default();
        store.get_or_create("latte").pinned = true;
        store.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("pinned = true"));
        assert!(!text.contains("theme_mode"));
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut store = AnnotationStore::default();
        store.get_or_create("latte").comment = "warm".into();
        let again = store.get_or_create("latte");
        assert_eq!(again.comment, "warm");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_never_inserts() {
        let store = AnnotationStore::default();
        assert!(store.get("latte").is_none());
        assert_eq!(store.len(), 0);
    }

    #[rstest]
    #[case(ModeTag::Unset, ModeTag::Light)]
    #[case(ModeTag::Light, ModeTag::Dark)]
    #[case(ModeTag::Dark, ModeTag::Unset)]
    fn mode_tag_ring(#[case] from: ModeTag, #[case] to: ModeTag) {
        assert_eq!(from.next(), to);
    }
}
