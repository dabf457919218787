//! Directory listing implementation using walkdir.

use super::{filter::ImageFilter, ImageScanner, ScanResult};
use crate::core::classifier::FilenameClassifier;
use crate::core::entry::Entry;
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Whether symbolic links to files count as files
    pub follow_symlinks: bool,
    /// Whether to include hidden files
    pub include_hidden: bool,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            include_hidden: true,
            extensions: None,
        }
    }
}

/// Non-recursive scanner over a single directory
pub struct DirectoryScanner {
    config: ScanConfig,
    filter: ImageFilter,
    classifier: FilenameClassifier,
}

impl DirectoryScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self {
            config,
            filter,
            classifier: FilenameClassifier::default(),
        }
    }

    /// Replace the classifier used to derive group keys
    pub fn with_classifier(mut self, classifier: FilenameClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    fn scan_directory(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut entries = Vec::new();
        let mut errors = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.config.follow_symlinks);

        for entry_result in walker {
            let dir_entry = match entry_result {
                Ok(dir_entry) => dir_entry,
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    // Unreadable entries outside the allow-list are not images
                    if e.depth() > 0 && !self.filter.should_include(&path) {
                        debug!(path = %path.display(), "Ignoring unreadable non-image entry");
                        continue;
                    }

                    let permission_denied = e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied);

                    // Failing to list the root itself means there is nothing to scan
                    if e.depth() == 0 {
                        return Err(if permission_denied {
                            ScanError::PermissionDenied { path }
                        } else {
                            ScanError::ReadDirectory {
                                path,
                                source: std::io::Error::other(e.to_string()),
                            }
                        });
                    }

                    let error = if permission_denied {
                        ScanError::PermissionDenied { path }
                    } else {
                        ScanError::ReadMetadata {
                            path,
                            source: std::io::Error::other(e.to_string()),
                        }
                    };
                    self.report_skip(&error, events);
                    errors.push(error);
                    continue;
                }
            };

            let path = dir_entry.path();
            if !dir_entry.file_type().is_file() || !self.filter.should_include(path) {
                continue;
            }

            // The persisted index stores paths as text
            if path.to_str().is_none() {
                let error = ScanError::InvalidFileName {
                    path: path.to_path_buf(),
                };
                self.report_skip(&error, events);
                errors.push(error);
                continue;
            }

            let modified = dir_entry
                .metadata()
                .map_err(|e| {
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("metadata unavailable"))
                })
                .and_then(|metadata| metadata.modified());

            match modified {
                Ok(modified) => {
                    let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                    let group_key = self.classifier.classify(&file_name);

                    debug!(
                        path = %path.display(),
                        format = ?self.filter.get_format(path),
                        group_key = %group_key,
                        "Indexed image"
                    );

                    events.send(Event::Scan(ScanEvent::ImageFound {
                        path: path.to_path_buf(),
                        group_key: group_key.clone(),
                    }));

                    entries.push(Entry::new(path, DateTime::<Utc>::from(modified), group_key));
                }
                Err(source) => {
                    let error = ScanError::ReadMetadata {
                        path: path.to_path_buf(),
                        source,
                    };
                    self.report_skip(&error, events);
                    errors.push(error);
                }
            }
        }

        Ok(ScanResult { entries, errors })
    }

    fn report_skip(&self, error: &ScanError, events: &EventSender) {
        warn!(%error, "Skipping file");

        if let ScanError::ReadMetadata { path, .. }
        | ScanError::PermissionDenied { path }
        | ScanError::InvalidFileName { path } = error
        {
            events.send(Event::Scan(ScanEvent::Error {
                path: path.clone(),
                message: error.to_string(),
            }));
        }
    }
}

impl ImageScanner for DirectoryScanner {
    fn scan(&self, directory: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(directory, &crate::events::null_sender())
    }

    fn scan_with_events(
        &self,
        directory: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            directory: directory.to_path_buf(),
        }));

        let result = match self.scan_directory(directory, events) {
            Ok(result) => result,
            Err(e) => {
                if matches!(e, ScanError::DirectoryNotFound { .. }) {
                    events.send(Event::Scan(ScanEvent::NotFound {
                        directory: directory.to_path_buf(),
                    }));
                }
                return Err(e);
            }
        };

        info!(
            directory = %directory.display(),
            images = result.entries.len(),
            skipped = result.skipped(),
            "Scan finished"
        );

        events.send(Event::Scan(ScanEvent::Completed {
            total_images: result.entries.len(),
            skipped: result.skipped(),
        }));

        Ok(result)
    }
}
