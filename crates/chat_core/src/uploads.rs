//! crates/chat_core/src/uploads.rs
//!
//! Tracks files shown in the upload banner. Entries are matched by name.

use crate::domain::{UploadStatus, UploadedFile};

#[derive(Debug, Default)]
pub struct UploadTracker {
    files: Vec<UploadedFile>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new entry in the `Uploading` stage. Duplicate names are kept.
    pub fn add(&mut self, name: &str) {
        self.files.push(UploadedFile {
            name: name.to_string(),
            status: UploadStatus::Uploading,
            page_count: None,
        });
    }

    /// Moves every entry named `name` that sits in the predecessor stage of
    /// `status` into `status`. Entries in any other stage are left alone, so a
    /// file never skips or regresses. Returns the number of entries moved.
    pub fn advance(&mut self, name: &str, status: UploadStatus, page_count: Option<u32>) -> usize {
        let Some(from) = status.predecessor() else {
            return 0;
        };
        let mut moved = 0;
        for file in self
            .files
            .iter_mut()
            .filter(|f| f.name == name && f.status == from)
        {
            file.status = status;
            if status == UploadStatus::Ready {
                file.page_count = page_count;
            }
            moved += 1;
        }
        moved
    }

    /// Removes every entry named `name`, whatever its stage.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.files.len();
        self.files.retain(|f| f.name != name);
        before - self.files.len()
    }

    pub fn list(&self) -> &[UploadedFile] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(tracker: &UploadTracker) -> Vec<UploadStatus> {
        tracker.list().iter().map(|f| f.status).collect()
    }

    #[test]
    fn add_starts_uploading_in_order() {
        let mut tracker = UploadTracker::new();
        tracker.add("a.pdf");
        tracker.add("b.pdf");
        let names: Vec<_> = tracker.list().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.pdf"]);
        assert_eq!(statuses(&tracker), [UploadStatus::Uploading; 2]);
    }

    #[test]
    fn advance_walks_forward_and_sets_pages_on_ready() {
        let mut tracker = UploadTracker::new();
        tracker.add("a.pdf");
        assert_eq!(tracker.advance("a.pdf", UploadStatus::Processing, None), 1);
        assert_eq!(tracker.list()[0].page_count, None);
        assert_eq!(tracker.advance("a.pdf", UploadStatus::Ready, Some(17)), 1);
        assert_eq!(tracker.list()[0].status, UploadStatus::Ready);
        assert_eq!(tracker.list()[0].page_count, Some(17));
    }

    #[test]
    fn ready_never_skips_processing() {
        let mut tracker = UploadTracker::new();
        tracker.add("a.pdf");
        assert_eq!(tracker.advance("a.pdf", UploadStatus::Ready, Some(9)), 0);
        assert_eq!(tracker.list()[0].status, UploadStatus::Uploading);
        assert_eq!(tracker.list()[0].page_count, None);
    }

    #[test]
    fn processing_never_regresses_ready() {
        let mut tracker = UploadTracker::new();
        tracker.add("a.pdf");
        tracker.advance("a.pdf", UploadStatus::Processing, None);
        tracker.advance("a.pdf", UploadStatus::Ready, Some(9));
        assert_eq!(tracker.advance("a.pdf", UploadStatus::Processing, None), 0);
        assert_eq!(tracker.list()[0].status, UploadStatus::Ready);
    }

    #[test]
    fn duplicate_names_advance_together() {
        let mut tracker = UploadTracker::new();
        tracker.add("a.pdf");
        tracker.add("a.pdf");
        assert_eq!(tracker.advance("a.pdf", UploadStatus::Processing, None), 2);
        assert_eq!(statuses(&tracker), [UploadStatus::Processing; 2]);
    }

    #[test]
    fn remove_drops_every_match_and_later_advance_is_inert() {
        let mut tracker = UploadTracker::new();
        tracker.add("a.pdf");
        tracker.add("b.pdf");
        tracker.add("a.pdf");
        assert_eq!(tracker.remove("a.pdf"), 2);
        assert_eq!(tracker.advance("a.pdf", UploadStatus::Processing, None), 0);
        assert_eq!(tracker.list().len(), 1);
        assert_eq!(tracker.list()[0].name, "b.pdf");
    }
}
