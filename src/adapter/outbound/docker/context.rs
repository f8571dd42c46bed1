//! In-memory build context for the agent image.

use std::fs;
use std::path::Path;

use crate::error::BackendError;

/// Name the Dockerfile takes inside the build context.
pub(super) const DOCKERFILE: &str = "Dockerfile";

/// Pack the Dockerfile at `source` into a tar archive holding just that file.
pub(super) fn dockerfile_context(source: &Path) -> Result<Vec<u8>, BackendError> {
    let read_err = |source_err| BackendError::ImageSource {
        path: source.to_path_buf(),
        source: source_err,
    };

    let contents = fs::read(source).map_err(read_err)?;

    let mut header = tar::Header::new_gnu();
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);

    let mut archive = tar::Builder::new(Vec::new());
    archive
        .append_data(&mut header, DOCKERFILE, contents.as_slice())
        .map_err(read_err)?;
    archive.into_inner().map_err(read_err)
}
