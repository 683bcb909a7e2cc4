use std::fs;
use std::path::Path;

use util::os_str_to_string;

use crate::{Axis, Error, FileSet, Topology};

impl FileSet {
    /// Create a file set from an existing structure in `directory`.
    ///
    /// If `directory` has subdirectories, they become the (sorted) cases, `sequence`
    /// becomes the identifiers, and every case must hold the same filenames.
    /// Otherwise the (sorted) files directly under `directory` are mapped onto
    /// `sequence`, which is taken as the `source` axis of a flat set.
    ///
    /// Nothing is created unless the structure checks out.
    pub fn from_directory<P: AsRef<Path>>(
        directory: P,
        sequence: Vec<String>,
        source: Axis,
    ) -> Result<Self, Error> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(Error::DirectoryNotFound(directory.to_path_buf()));
        }

        let listing = Listing::read(directory)?;
        if !listing.dirs.is_empty() {
            if source == Axis::Cases {
                return Err(Error::InvalidConfiguration(
                    "filenames cannot be keyed by cases when case subdirectories are present"
                        .into(),
                ));
            }
            let filenames = consistent_filenames(directory, &listing.dirs)?;
            log::debug!(
                "found nested file set in {directory:?}: {} cases, files {filenames:?}",
                listing.dirs.len()
            );
            Self::new(
                directory,
                Some(listing.dirs),
                Some(sequence),
                filenames,
                Axis::Identifiers,
                Topology::Nested,
            )
        } else {
            log::debug!("found flat file set in {directory:?}: files {:?}", listing.files);
            let (cases, identifiers) = match source {
                Axis::Cases => (Some(sequence), None),
                Axis::Identifiers => (None, Some(sequence)),
            };
            Self::new(directory, cases, identifiers, listing.files, source, Topology::Flat)
        }
    }

    /// Check the file set against the disk: every addressable file must exist and,
    /// for nested sets, every case directory must hold the same filenames.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.directory().is_dir() {
            return Err(Error::DirectoryNotFound(self.directory().to_path_buf()));
        }
        if self.topology() == Topology::Nested {
            consistent_filenames(self.directory(), self.axis(Axis::Cases))?;
        }
        for file in self.files(None, None)? {
            if !file.is_file() {
                return Err(Error::MissingFile(file));
            }
        }
        Ok(())
    }
}

/// Sorted names of the subdirectories and files directly inside a directory.
struct Listing {
    dirs: Vec<String>,
    files: Vec<String>,
}

impl Listing {
    fn read(directory: &Path) -> Result<Self, Error> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in fs::read_dir(directory).map_err(|e| Error::io(directory, e))? {
            let entry = entry.map_err(|e| Error::io(directory, e))?;
            let name = os_str_to_string(&entry.file_name())?;
            if entry.path().is_dir() {
                dirs.push(name);
            } else {
                files.push(name);
            }
        }
        dirs.sort_unstable();
        files.sort_unstable();
        Ok(Self { dirs, files })
    }
}

/// Filenames shared by all `cases` under `directory`, in sorted order.
fn consistent_filenames(directory: &Path, cases: &[String]) -> Result<Vec<String>, Error> {
    let Some((first, rest)) = cases.split_first() else {
        return Ok(Vec::new());
    };
    let expected = Listing::read(&directory.join(first))?.files;
    for case in rest {
        let dir = directory.join(case);
        let found = Listing::read(&dir)?.files;
        if found != expected {
            return Err(Error::Inconsistent {
                dir,
                case: case.clone(),
                expected,
                found,
            });
        }
    }
    Ok(expected)
}
