//! Grouping manifest: a JSON object mapping group key → ordered list of
//! workbook file names. Drives which files are merged into which store.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupManifest {
    pub groups: BTreeMap<String, Vec<String>>,
}

impl GroupManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening manifest {path:?}"))?;
        let reader = BufReader::new(file);
        let manifest =
            serde_json::from_reader(reader).with_context(|| format!("Parsing manifest {path:?}"))?;
        Ok(manifest)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn manifest_parses_a_plain_json_object() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("groups.json");
        let mut file = File::create(&path).expect("create manifest");
        write!(
            file,
            r#"{{"7550000001": ["jan.xlsx", "feb.xlsx"], "7550000002": ["jan.xlsx"]}}"#
        )
        .unwrap();

        let manifest = GroupManifest::load(&path).expect("load manifest");
        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.groups["7550000001"],
            vec!["jan.xlsx".to_string(), "feb.xlsx".to_string()]
        );
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(GroupManifest::load(&path).is_err());
    }
}
