//! Tokio adapters: writing an archive to an [`AsyncWrite`](::tokio::io::AsyncWrite)
//! or reading it as an [`AsyncRead`](::tokio::io::AsyncRead).

pub mod archive;
mod async_wrapper;
