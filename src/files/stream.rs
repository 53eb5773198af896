// ABOUTME: Bounded-chunk reader over a resolved file
// ABOUTME: Seek-then-read access and an async byte stream that never buffers the whole file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use futures_util::Stream;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use motionctl_core::constants::limits::FILE_CHUNK_SIZE;

/// An opened file served in chunks
#[derive(Debug)]
pub struct FileStream {
    file: File,
    path: PathBuf,
    size: u64,
    chunk_size: usize,
}

impl FileStream {
    pub(super) fn new(file: File, path: PathBuf, size: u64) -> Self {
        Self {
            file,
            path,
            size,
            chunk_size: FILE_CHUNK_SIZE,
        }
    }

    /// Use a different chunk size
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Canonical path of the file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes at open time
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Read at most `max` bytes starting at `position`
    ///
    /// An empty chunk means end of file.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error from seeking or reading
    pub async fn read_chunk(&mut self, position: u64, max: usize) -> io::Result<Bytes> {
        self.file.seek(SeekFrom::Start(position)).await?;
        let mut buffer = BytesMut::zeroed(max.min(self.chunk_size));
        let mut filled = 0;
        while filled < buffer.len() {
            let read = self.file.read(&mut buffer[filled..]).await?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        buffer.truncate(filled);
        Ok(buffer.freeze())
    }

    /// Consume into a stream of chunks
    pub fn into_stream(mut self) -> impl Stream<Item = io::Result<Bytes>> + Send {
        async_stream::try_stream! {
            let mut position = 0_u64;
            loop {
                let chunk = self.read_chunk(position, self.chunk_size).await?;
                if chunk.is_empty() {
                    break;
                }
                position += chunk.len() as u64;
                yield chunk;
            }
        }
    }
}
