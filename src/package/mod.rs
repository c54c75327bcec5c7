//! Download and installation of the Sealights agent package.
pub mod downloader;
pub mod extract;
pub mod installer;
pub mod url;
