use {
    std::{
        io,
        path::{Path, PathBuf},
    },
    tracing::{debug, warn},
};

/// Location of the temporary encrypted copy of `path`.
#[must_use]
#[inline]
pub fn encrypted_path(path: &Path) -> PathBuf {
    let mut encrypted = path.as_os_str().to_owned();
    encrypted.push(".iron");
    encrypted.into()
}

/// Removal failures are only logged: the upload result is what matters.
pub fn remove_encrypted_copy(path: &Path) {
    match fs_err::remove_file(path) {
        Ok(()) => debug!(?path, "removed encrypted copy"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(error = %err, "failed to remove encrypted copy"),
    }
}
