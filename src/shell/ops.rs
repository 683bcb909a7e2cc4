use std::fs;
use std::path::Path;

use super::Error;

/// Copy `src` to `dest`, overwriting `dest` if it exists.
pub fn cp(src: &Path, dest: &Path) -> Result<(), Error> {
    check_source(src)?;
    fs::copy(src, dest)?;
    check_created(dest)
}

/// Copy `src` to `dest`, only if `dest` does not exist yet.
pub fn scp(src: &Path, dest: &Path) -> Result<(), Error> {
    check_vacant(dest)?;
    cp(src, dest)
}

fn check_source(src: &Path) -> Result<(), Error> {
    if src.is_file() {
        Ok(())
    } else {
        Err(Error::SourceMissing(src.to_path_buf()))
    }
}

fn check_vacant(dest: &Path) -> Result<(), Error> {
    if dest.exists() || dest.is_symlink() {
        Err(Error::DestinationExists(dest.to_path_buf()))
    } else {
        Ok(())
    }
}

fn check_created(dest: &Path) -> Result<(), Error> {
    if dest.is_file() {
        Ok(())
    } else {
        Err(Error::NotCreated(dest.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_copy_file() -> Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("src");
        fs::write(&src, "text to copy")?;

        let tgt = dir.path().join("tgt");
        scp(&src, &tgt)?;

        assert_eq!(fs::read_to_string(&tgt)?, "text to copy");
        assert!(src.exists());

        // secure copy refuses to overwrite, plain copy does not:
        fs::write(&src, "new text")?;
        assert!(matches!(scp(&src, &tgt), Err(Error::DestinationExists(_))));
        cp(&src, &tgt)?;
        assert_eq!(fs::read_to_string(&tgt)?, "new text");

        let missing = dir.path().join("missing");
        assert!(matches!(
            scp(&missing, &dir.path().join("other")),
            Err(Error::SourceMissing(_))
        ));
        Ok(())
    }
}
