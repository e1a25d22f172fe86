use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("public dir {0} does not exist")]
    MissingPublicDir(PathBuf),
    #[error("binding {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("server stopped: {0}")]
    Serve(#[from] io::Error),
}
