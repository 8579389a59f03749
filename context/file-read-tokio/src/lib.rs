// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Tokio-based file reading for datastore.
//!
//! `TokioFileRead` lets a [`Context`](datastore_core::Context) read files
//! without blocking the runtime: attachments uploaded from disk and federated
//! identity tokens both go through it.
//!
//! ## Example
//!
//! ```no_run
//! use datastore_core::{Context, OsEnv};
//! use datastore_file_read_tokio::TokioFileRead;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_env(OsEnv);
//!
//!     match ctx.file_read("/var/run/secrets/azure/tokens/azure-identity-token").await {
//!         Ok(content) => println!("Read {} bytes", content.len()),
//!         Err(e) => eprintln!("Failed to read file: {}", e),
//!     }
//! }
//! ```

use async_trait::async_trait;
use datastore_core::{Error, FileRead, Result};

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(format!("file {path} does not exist")).with_source(e)
            } else {
                Error::unexpected(format!("failed to read file {path}")).with_source(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datastore_core::{Context, ErrorKind};
    use std::io::Write;

    #[tokio::test]
    async fn test_read_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"invoice body").unwrap();

        let ctx = Context::new().with_file_read(TokioFileRead);
        let content = ctx
            .file_read_as_string(file.path().to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(content, "invoice body");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pdf");

        let err = TokioFileRead
            .file_read(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
