//! Concrete pipeline stages run by the command-line app.

use fileset::{Axis, FileSet, Topology};

/// Secure-copy every file of a file set
mod copy;
pub use copy::CopyStage;

/// Run an external command once per file
mod command;
pub use command::{CommandStage, CommandTemplate};

/// Every (case, identifier) key of `fileset`, in the order of `files(None, None)`.
fn addresses(fileset: &FileSet) -> Vec<(Option<&str>, Option<&str>)> {
    let cases = fileset.cases().unwrap_or_default();
    let identifiers = fileset.identifiers().unwrap_or_default();
    match (fileset.topology(), fileset.source()) {
        (Topology::Nested, _) => cases
            .iter()
            .flat_map(|c| identifiers.iter().map(move |i| (Some(c.as_str()), Some(i.as_str()))))
            .collect(),
        (Topology::Flat, Axis::Cases) => cases.iter().map(|c| (Some(c.as_str()), None)).collect(),
        (Topology::Flat, Axis::Identifiers) => {
            identifiers.iter().map(|i| (None, Some(i.as_str()))).collect()
        }
    }
}

/// Task description like "skull-strip c01/flair".
fn describe(what: &str, case: Option<&str>, identifier: Option<&str>) -> String {
    match (case, identifier) {
        (Some(c), Some(i)) => format!("{what} {c}/{i}"),
        (Some(k), None) | (None, Some(k)) => format!("{what} {k}"),
        (None, None) => what.to_owned(),
    }
}
