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

use std::path::Path;

use bytes::Bytes;
use datastore_core::{Context, Error, Result};

/// A named file to upload: the file name becomes the blob name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Blob name the content is stored under.
    pub file_name: String,
    /// `Content-Type` of the blob, if known.
    pub content_type: Option<String>,
    /// File content.
    pub content: Bytes,
}

impl Attachment {
    /// Create an attachment from in-memory content.
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            content: content.into(),
        }
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read an attachment from `path` through the context's file reader.
    ///
    /// The last path component is used as the file name.
    pub async fn from_path(ctx: &Context, path: &str) -> Result<Self> {
        let file_name = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::request_invalid(format!("{path} has no file name")))?;
        let content = ctx.file_read(path).await?;

        Ok(Self::new(file_name, content))
    }
}
