use super::SymmetryError;
use super::space_group::SpaceGroup;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Lookup of space groups by International Tables number.
///
/// Full tables belong to an external symmetry library; the kernel only needs this
/// narrow view of them.
pub trait SpaceGroupTable {
    fn space_group(&self, number: u16) -> Option<SpaceGroup>;
}

const BUILTIN_TABLE: &str = r#"
[[space-group]]
number = 1
symbol = "P 1"
operations = ["x,y,z"]

[[space-group]]
number = 2
symbol = "P -1"
operations = ["x,y,z", "-x,-y,-z"]

[[space-group]]
number = 4
symbol = "P 1 21 1"
operations = ["x,y,z", "-x,y+1/2,-z"]

[[space-group]]
number = 14
symbol = "P 1 21/c 1"
operations = ["x,y,z", "-x,y+1/2,-z+1/2", "-x,-y,-z", "x,-y+1/2,z+1/2"]

[[space-group]]
number = 19
symbol = "P 21 21 21"
operations = ["x,y,z", "-x+1/2,-y,z+1/2", "-x,y+1/2,-z+1/2", "x+1/2,-y+1/2,-z"]

[[space-group]]
number = 47
symbol = "P m m m"
operations = [
    "x,y,z", "-x,-y,z", "-x,y,-z", "x,-y,-z",
    "-x,-y,-z", "x,y,-z", "x,-y,z", "-x,y,z",
]
"#;

#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(rename = "space-group", default)]
    space_groups: Vec<TableEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableEntry {
    number: u16,
    symbol: String,
    operations: Vec<String>,
}

/// An in-memory space-group table.
#[derive(Debug, Clone, Default)]
pub struct SpaceGroupCatalog {
    groups: HashMap<u16, SpaceGroup>,
}

impl SpaceGroupCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small table covering P1, P-1, P2_1, P2_1/c, P2_12_12_1 and Pmmm.
    pub fn builtin() -> Result<Self, SymmetryError> {
        Self::from_toml_str(BUILTIN_TABLE, "<builtin>")
    }

    /// Loads a table from a TOML file of `[[space-group]]` entries.
    pub fn load(path: &Path) -> Result<Self, SymmetryError> {
        let content = std::fs::read_to_string(path).map_err(|e| SymmetryError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.to_string_lossy())
    }

    /// Parses a TOML table; `origin` only labels error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, SymmetryError> {
        let file: TableFile = toml::from_str(content).map_err(|e| SymmetryError::Toml {
            path: origin.to_string(),
            source: e,
        })?;

        let mut catalog = Self::new();
        for entry in file.space_groups {
            let group =
                SpaceGroup::from_operation_strings(entry.number, &entry.symbol, &entry.operations)?;
            catalog.insert(group)?;
        }
        Ok(catalog)
    }

    /// Adds a group, refusing to overwrite an existing number.
    pub fn insert(&mut self, group: SpaceGroup) -> Result<(), SymmetryError> {
        if self.groups.contains_key(&group.number) {
            return Err(SymmetryError::DuplicateSpaceGroup {
                number: group.number,
            });
        }
        self.groups.insert(group.number, group);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl SpaceGroupTable for SpaceGroupCatalog {
    fn space_group(&self, number: u16) -> Option<SpaceGroup> {
        match self.groups.get(&number) {
            Some(group) => Some(group.clone()),
            None if number == 1 => Some(SpaceGroup::identity()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_table_contains_expected_groups() {
        let catalog = SpaceGroupCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.space_group(14).unwrap().order(), 4);
        assert_eq!(catalog.space_group(47).unwrap().order(), 8);
        assert!(catalog.space_group(230).is_none());
    }

    #[test]
    fn p1_is_always_available() {
        let catalog = SpaceGroupCatalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.space_group(1).unwrap().is_identity());
    }

    #[test]
    fn load_reads_table_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[space-group]]
number = 3
symbol = "P 1 2 1"
operations = ["x,y,z", "-x,y,-z"]
"#
        )
        .unwrap();

        let catalog = SpaceGroupCatalog::load(file.path()).unwrap();
        let group = catalog.space_group(3).unwrap();
        assert_eq!(group.symbol, "P 1 2 1");
        assert_eq!(group.order(), 2);
    }

    #[test]
    fn load_reports_missing_file() {
        let result = SpaceGroupCatalog::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(SymmetryError::Io { .. })));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let result = SpaceGroupCatalog::from_toml_str("[[space-group]]\nnumber = ", "inline");
        assert!(matches!(result, Err(SymmetryError::Toml { .. })));
    }

    #[test]
    fn malformed_operation_is_reported() {
        let content = r#"
[[space-group]]
number = 2
symbol = "P -1"
operations = ["x,y,z", "-x,-y"]
"#;
        let result = SpaceGroupCatalog::from_toml_str(content, "inline");
        assert!(matches!(result, Err(SymmetryError::InvalidOperation { .. })));
    }

    #[test]
    fn duplicate_numbers_are_rejected() {
        let content = r#"
[[space-group]]
number = 2
symbol = "P -1"
operations = ["x,y,z", "-x,-y,-z"]

[[space-group]]
number = 2
symbol = "P -1 again"
operations = ["x,y,z"]
"#;
        let result = SpaceGroupCatalog::from_toml_str(content, "inline");
        assert!(matches!(
            result,
            Err(SymmetryError::DuplicateSpaceGroup { number: 2 })
        ));
    }
}
