// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory tar.gz fixture builder.
//!
//! Tests compose extension archives without touching the filesystem: add a
//! manifest, scripts (mode 0755), and arbitrary payload files, then `build()`
//! the compressed bytes.

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, Header};

/// Builder for tar.gz extension archives.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>, u32)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file (mode 0644).
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.entries
            .push((path.to_string(), content.as_bytes().to_vec(), 0o644));
        self
    }

    /// Add an executable script (mode 0755).
    pub fn script(mut self, path: &str, content: &str) -> Self {
        self.entries
            .push((path.to_string(), content.as_bytes().to_vec(), 0o755));
        self
    }

    /// Add the manifest at its fixed path, `extension.toml`.
    pub fn manifest(self, toml_content: &str) -> Self {
        self.file("extension.toml", toml_content)
    }

    /// Add a raw entry with an explicit mode.
    pub fn raw(mut self, path: &str, content: &[u8], mode: u32) -> Self {
        self.entries.push((path.to_string(), content.to_vec(), mode));
        self
    }

    /// Serialize all entries into gzip-compressed tar bytes.
    pub fn build(self) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        {
            let mut builder = Builder::new(&mut encoder);
            for (path, data, mode) in &self.entries {
                let mut header = Header::new_gnu();
                header.set_size(data.len() as u64);
                header.set_mode(*mode);
                header.set_cksum();
                builder
                    .append_data(&mut header, path.as_str(), data.as_slice())
                    .expect("append archive entry");
            }
            builder.finish().expect("finish archive");
        }
        encoder.finish().expect("finish gzip stream")
    }
}

/// A complete minimal extension archive: manifest plus a success script.
pub fn minimal_extension_archive(name: &str) -> Vec<u8> {
    ArchiveBuilder::new()
        .manifest(&format!("[extension]\nname = \"{name}\"\n"))
        .script("scripts/success.sh", "#!/bin/sh\nexit 0\n")
        .build()
}
