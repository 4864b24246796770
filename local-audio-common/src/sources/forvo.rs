//! Speaker-tagged recordings: `speaker/expression.ext`

use super::scan::AudioFileWalker;
use super::{SourceDescriptor, SourceError};
use crate::db::Entry;
use crate::media::relative_file_string;
use tracing::debug;

pub(super) fn collect_entries(descriptor: &SourceDescriptor) -> Result<Vec<Entry>, SourceError> {
    let root = &descriptor.media_dir;
    let mut entries = Vec::new();

    for path in AudioFileWalker::new(&descriptor.id).walk(root)? {
        let Some(relative) = relative_file_string(root, &path) else {
            continue;
        };

        let speaker = match path.parent() {
            Some(parent) if parent != root.as_path() => parent.file_name(),
            _ => None,
        };
        let Some(speaker) = speaker.map(|s| s.to_string_lossy().into_owned()) else {
            debug!("({}) Skipping file outside a speaker directory: {}", descriptor.id, relative);
            continue;
        };
        let Some(expression) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        // the speaker doubles as display text, e.g. "Forvo (%s)"
        entries.push(
            Entry::new(expression, None, &descriptor.id, relative)
                .with_speaker(speaker.clone())
                .with_display(Some(speaker)),
        );
    }

    Ok(entries)
}
