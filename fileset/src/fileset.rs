use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use util::{HashMap, HashSet};

use crate::Error;

/// Directory layout of a file set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// One subdirectory per case, each holding one file per identifier.
    Nested,
    /// All files directly under the root, one per case or one per identifier.
    Flat,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nested => f.write_str("nested"),
            Self::Flat => f.write_str("flat"),
        }
    }
}

/// One of the two key axes of a file set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Cases,
    Identifiers,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cases => f.write_str("cases"),
            Self::Identifiers => f.write_str("identifiers"),
        }
    }
}

/// An ordered collection of files on disk, addressed by case and/or identifier.
///
/// Construction validates the combination of axes, filenames and topology, and
/// creates the root directory (plus one subdirectory per case for nested sets).
/// A `FileSet` never writes or removes files; it only names them.
#[derive(Debug, Clone)]
pub struct FileSet {
    directory: PathBuf,
    cases: Option<Vec<String>>,
    identifiers: Option<Vec<String>>,
    /// filename for each key on the `source` axis
    filenames: HashMap<String, String>,
    source: Axis,
    topology: Topology,
}

impl FileSet {
    /// Create a new file set rooted at `directory`.
    ///
    /// `filenames` correspond, in order, to the keys of the `source` axis.
    /// Empty axes are treated as absent.
    pub fn new<P: AsRef<Path>>(
        directory: P,
        cases: Option<Vec<String>>,
        identifiers: Option<Vec<String>>,
        filenames: Vec<String>,
        source: Axis,
        topology: Topology,
    ) -> Result<Self, Error> {
        let cases = cases.filter(|v| !v.is_empty());
        let identifiers = identifiers.filter(|v| !v.is_empty());

        let filenames = check_config(
            cases.as_deref(),
            identifiers.as_deref(),
            filenames,
            source,
            topology,
        )?;

        let fileset = Self {
            directory: directory.as_ref().to_path_buf(),
            cases,
            identifiers,
            filenames,
            source,
            topology,
        };
        fileset.create_dirs()?;
        Ok(fileset)
    }

    /// Create a nested file set: `<directory>/<case>/<filename of identifier>`.
    pub fn nested<P: AsRef<Path>>(
        directory: P,
        cases: Vec<String>,
        identifiers: Vec<String>,
        filenames: Vec<String>,
    ) -> Result<Self, Error> {
        Self::new(
            directory,
            Some(cases),
            Some(identifiers),
            filenames,
            Axis::Identifiers,
            Topology::Nested,
        )
    }

    /// Create a flat file set: `<directory>/<filename of key>`, keyed by `source`.
    pub fn flat<P: AsRef<Path>>(
        directory: P,
        source: Axis,
        keys: Vec<String>,
        filenames: Vec<String>,
    ) -> Result<Self, Error> {
        let (cases, identifiers) = match source {
            Axis::Cases => (Some(keys), None),
            Axis::Identifiers => (None, Some(keys)),
        };
        Self::new(directory, cases, identifiers, filenames, source, Topology::Flat)
    }

    /// Create a new, empty file set in `directory` with the same structure as `other`.
    pub fn from_fileset<P: AsRef<Path>>(directory: P, other: &FileSet) -> Result<Self, Error> {
        let filenames = other
            .source_keys()
            .iter()
            .map(|key| other.lookup(key).map(str::to_owned))
            .collect::<Result<_, _>>()?;
        Self::new(
            directory,
            other.cases.clone(),
            other.identifiers.clone(),
            filenames,
            other.source,
            other.topology,
        )
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn cases(&self) -> Option<&[String]> {
        self.cases.as_deref()
    }

    pub fn identifiers(&self) -> Option<&[String]> {
        self.identifiers.as_deref()
    }

    pub fn source(&self) -> Axis {
        self.source
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// All filenames, ordered by their key.
    pub fn filenames(&self) -> Vec<&str> {
        let mut pairs: Vec<(&String, &String)> = self.filenames.iter().collect();
        pairs.sort_unstable();
        pairs.into_iter().map(|(_, f)| f.as_str()).collect()
    }

    /// Bare filename of the file addressed by `case` and `identifier`.
    pub fn filename(&self, case: Option<&str>, identifier: Option<&str>) -> Result<&str, Error> {
        match self.topology {
            Topology::Nested => {
                let (case, identifier) = self.nested_key(case, identifier)?;
                self.check_case(case)?;
                self.lookup(identifier)
            }
            Topology::Flat => self.lookup(self.flat_key(case, identifier)?),
        }
    }

    /// Path to the file addressed by `case` and `identifier`.
    ///
    /// Nested sets need both. Flat sets need the key of their source axis;
    /// the other argument is ignored.
    pub fn file(&self, case: Option<&str>, identifier: Option<&str>) -> Result<PathBuf, Error> {
        let filename = self.filename(case, identifier)?;
        Ok(match (self.topology, case) {
            (Topology::Nested, Some(case)) => self.directory.join(case).join(filename),
            _ => self.directory.join(filename),
        })
    }

    /// Paths to all files selected by at most one of `case` and `identifier`.
    ///
    /// With no argument, every file of the set. On a nested set, a `case`
    /// selects all of that case's files and an `identifier` selects that
    /// identifier's file in every case. Flat sets only support the no-argument form.
    pub fn files(&self, case: Option<&str>, identifier: Option<&str>) -> Result<Vec<PathBuf>, Error> {
        match (self.topology, case, identifier) {
            (_, Some(_), Some(_)) => Err(self.unsupported(
                case,
                identifier,
                "supply at most one of case and identifier",
            )),
            (Topology::Flat, None, None) => self
                .source_keys()
                .iter()
                .map(|key| Ok(self.directory.join(self.lookup(key)?)))
                .collect(),
            (Topology::Flat, _, _) => Err(self.unsupported(
                case,
                identifier,
                "selecting by case or identifier needs a nested file set",
            )),
            (Topology::Nested, Some(case), None) => {
                self.check_case(case)?;
                self.axis(Axis::Identifiers)
                    .iter()
                    .map(|id| Ok(self.directory.join(case).join(self.lookup(id)?)))
                    .collect()
            }
            (Topology::Nested, None, Some(identifier)) => {
                let filename = self.lookup(identifier)?;
                Ok(self
                    .axis(Axis::Cases)
                    .iter()
                    .map(|case| self.directory.join(case).join(filename))
                    .collect())
            }
            (Topology::Nested, None, None) => {
                let mut files = Vec::with_capacity(self.filenames.len() * self.axis(Axis::Cases).len());
                for case in self.axis(Axis::Cases) {
                    for id in self.axis(Axis::Identifiers) {
                        files.push(self.directory.join(case).join(self.lookup(id)?));
                    }
                }
                Ok(files)
            }
        }
    }

    pub(crate) fn axis(&self, axis: Axis) -> &[String] {
        match axis {
            Axis::Cases => self.cases.as_deref().unwrap_or(&[]),
            Axis::Identifiers => self.identifiers.as_deref().unwrap_or(&[]),
        }
    }

    fn source_keys(&self) -> &[String] {
        self.axis(self.source)
    }

    fn nested_key<'a>(
        &self,
        case: Option<&'a str>,
        identifier: Option<&'a str>,
    ) -> Result<(&'a str, &'a str), Error> {
        match (case, identifier) {
            (Some(case), Some(identifier)) => Ok((case, identifier)),
            _ => Err(self.unsupported(
                case,
                identifier,
                "both case and identifier must be supplied",
            )),
        }
    }

    fn flat_key<'a>(&self, case: Option<&'a str>, identifier: Option<&'a str>) -> Result<&'a str, Error> {
        let (key, reason) = match self.source {
            Axis::Cases => (case, "file set is keyed by cases; a case must be supplied"),
            Axis::Identifiers => (
                identifier,
                "file set is keyed by identifiers; an identifier must be supplied",
            ),
        };
        key.ok_or_else(|| self.unsupported(case, identifier, reason))
    }

    fn lookup(&self, key: &str) -> Result<&str, Error> {
        self.filenames
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| match self.source {
                Axis::Cases => Error::UnknownCase(key.to_owned()),
                Axis::Identifiers => Error::UnknownIdentifier(key.to_owned()),
            })
    }

    fn check_case(&self, case: &str) -> Result<(), Error> {
        if self.axis(Axis::Cases).iter().any(|c| c == case) {
            Ok(())
        } else {
            Err(Error::UnknownCase(case.to_owned()))
        }
    }

    fn unsupported(&self, case: Option<&str>, identifier: Option<&str>, reason: &'static str) -> Error {
        let supplied = match (case, identifier) {
            (None, None) => "neither case nor identifier",
            (Some(_), None) => "case only",
            (None, Some(_)) => "identifier only",
            (Some(_), Some(_)) => "case and identifier",
        };
        Error::UnsupportedCombination {
            topology: self.topology,
            supplied,
            reason,
        }
    }

    fn create_dirs(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.directory).map_err(|e| Error::io(&self.directory, e))?;
        if self.topology == Topology::Nested {
            for case in self.axis(Axis::Cases) {
                let dir = self.directory.join(case);
                fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
            }
        }
        Ok(())
    }
}

/// Check axis/topology/filename invariants, returning the key-to-filename map.
fn check_config(
    cases: Option<&[String]>,
    identifiers: Option<&[String]>,
    filenames: Vec<String>,
    source: Axis,
    topology: Topology,
) -> Result<HashMap<String, String>, Error> {
    let invalid = |msg: String| Err(Error::InvalidConfiguration(msg));

    if topology == Topology::Nested && source == Axis::Cases {
        return invalid("filenames of a nested file set cannot be keyed by cases".into());
    }
    match (cases, identifiers, topology) {
        (None, None, _) => {
            return invalid("at least one of cases and identifiers must be supplied".into())
        }
        (None, _, Topology::Nested) | (_, None, Topology::Nested) => {
            return invalid("a nested file set requires both cases and identifiers".into())
        }
        (Some(_), Some(_), Topology::Flat) => {
            return invalid("a flat file set is keyed by either cases or identifiers, not both".into())
        }
        _ => (),
    }

    if let Some(cases) = cases {
        check_unique(Axis::Cases, cases)?;
    }
    if let Some(identifiers) = identifiers {
        check_unique(Axis::Identifiers, identifiers)?;
    }

    let keys = match source {
        Axis::Cases => cases,
        Axis::Identifiers => identifiers,
    };
    let Some(keys) = keys else {
        return invalid(format!("filenames are keyed by {source}, but no {source} were supplied"));
    };
    if keys.len() != filenames.len() {
        return invalid(format!(
            "with filenames keyed by {source}, {} filenames are required, got {}",
            keys.len(),
            filenames.len()
        ));
    }

    let mut map = HashMap::with_capacity_and_hasher(keys.len(), Default::default());
    map.extend(keys.iter().cloned().zip(filenames));
    Ok(map)
}

fn check_unique(axis: Axis, keys: &[String]) -> Result<(), Error> {
    let mut seen = HashSet::with_capacity_and_hasher(keys.len(), Default::default());
    for key in keys {
        if !seen.insert(key.as_str()) {
            return Err(Error::InvalidConfiguration(format!(
                "duplicate entry \"{key}\" in {axis}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn nested_set(root: &Path) -> Result<FileSet> {
        Ok(FileSet::nested(
            root,
            strs(&["c1", "c2"]),
            strs(&["t1", "t2"]),
            strs(&["t1.nii.gz", "t2.nii.gz"]),
        )?)
    }

    #[test]
    fn test_nested_cross_product() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("set");
        let fs = nested_set(&root)?;

        assert!(root.join("c1").is_dir());
        assert!(root.join("c2").is_dir());

        assert_eq!(
            fs.file(Some("c1"), Some("t2"))?,
            root.join("c1").join("t2.nii.gz")
        );

        let all = fs.files(None, None)?;
        assert_eq!(
            all,
            vec![
                root.join("c1/t1.nii.gz"),
                root.join("c1/t2.nii.gz"),
                root.join("c2/t1.nii.gz"),
                root.join("c2/t2.nii.gz"),
            ]
        );

        assert_eq!(
            fs.files(Some("c2"), None)?,
            vec![root.join("c2/t1.nii.gz"), root.join("c2/t2.nii.gz")]
        );
        assert_eq!(
            fs.files(None, Some("t1"))?,
            vec![root.join("c1/t1.nii.gz"), root.join("c2/t1.nii.gz")]
        );
        Ok(())
    }

    #[test]
    fn test_nested_addressing_errors() -> Result<()> {
        let dir = tempdir()?;
        let fs = nested_set(dir.path())?;

        let err = fs.file(Some("c1"), None).unwrap_err();
        assert!(err.is_addressing());
        assert!(matches!(
            err,
            Error::UnsupportedCombination { supplied: "case only", .. }
        ));
        assert!(matches!(
            fs.file(None, None),
            Err(Error::UnsupportedCombination { .. })
        ));
        assert!(matches!(
            fs.files(Some("c1"), Some("t1")),
            Err(Error::UnsupportedCombination { .. })
        ));
        assert!(matches!(
            fs.file(Some("c9"), Some("t1")),
            Err(Error::UnknownCase(_))
        ));
        assert!(matches!(
            fs.file(Some("c1"), Some("t9")),
            Err(Error::UnknownIdentifier(_))
        ));
        Ok(())
    }

    #[test]
    fn test_flat_by_cases() -> Result<()> {
        let dir = tempdir()?;
        let fs = FileSet::flat(
            dir.path(),
            Axis::Cases,
            strs(&["02", "01"]),
            strs(&["02.nii.gz", "01.nii.gz"]),
        )?;

        assert_eq!(fs.file(Some("01"), None)?, dir.path().join("01.nii.gz"));
        // non-source axis is ignored:
        assert_eq!(
            fs.file(Some("01"), Some("flair"))?,
            dir.path().join("01.nii.gz")
        );
        assert_eq!(fs.filename(Some("02"), None)?, "02.nii.gz");
        assert!(matches!(
            fs.file(None, Some("flair")),
            Err(Error::UnsupportedCombination { .. })
        ));

        // registration order, not key order:
        assert_eq!(
            fs.files(None, None)?,
            vec![dir.path().join("02.nii.gz"), dir.path().join("01.nii.gz")]
        );
        assert_eq!(fs.filenames(), vec!["01.nii.gz", "02.nii.gz"]);
        assert!(matches!(
            fs.files(Some("01"), None),
            Err(Error::UnsupportedCombination { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_configurations() -> Result<()> {
        let dir = tempdir()?;
        let invalid = |r: Result<FileSet, Error>| matches!(r, Err(Error::InvalidConfiguration(_)));

        assert!(invalid(FileSet::new(
            dir.path(),
            Some(strs(&["c1"])),
            Some(strs(&["t1"])),
            strs(&["c1.nii"]),
            Axis::Cases,
            Topology::Nested,
        )));
        assert!(invalid(FileSet::new(
            dir.path(),
            None,
            Some(Vec::new()),
            Vec::new(),
            Axis::Identifiers,
            Topology::Flat,
        )));
        assert!(invalid(FileSet::nested(
            dir.path(),
            strs(&["c1"]),
            strs(&["t1", "t2"]),
            strs(&["t1.nii"]),
        )));
        assert!(invalid(FileSet::new(
            dir.path(),
            Some(strs(&["c1"])),
            Some(strs(&["t1"])),
            strs(&["t1.nii"]),
            Axis::Identifiers,
            Topology::Flat,
        )));
        assert!(invalid(FileSet::flat(
            dir.path(),
            Axis::Cases,
            strs(&["c1", "c1"]),
            strs(&["a", "b"]),
        )));
        Ok(())
    }

    #[test]
    fn test_from_fileset() -> Result<()> {
        let dir = tempdir()?;
        let original = nested_set(&dir.path().join("a"))?;
        let copy = FileSet::from_fileset(dir.path().join("b"), &original)?;

        assert!(dir.path().join("b/c2").is_dir());
        assert_eq!(copy.topology(), Topology::Nested);
        assert_eq!(copy.source(), Axis::Identifiers);
        assert_eq!(
            copy.file(Some("c2"), Some("t1"))?,
            dir.path().join("b/c2/t1.nii.gz")
        );
        assert_eq!(copy.filenames(), original.filenames());
        Ok(())
    }
}
