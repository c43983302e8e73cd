use crate::model::question::{QuestionBank, Section};
use crate::model::response::ResponseStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStatus {
    NotStarted,
    InProgress,
    Complete,
}

/// Answered/total counts for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionProgress {
    pub name: String,
    pub answered: usize,
    pub total: usize,
}

impl SectionProgress {
    #[must_use]
    pub fn compute(section: &Section, store: &ResponseStore) -> Self {
        Self {
            name: section.name().to_owned(),
            answered: store.answered_count(section),
            total: section.len(),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answered == self.total
    }

    #[must_use]
    pub fn status(&self) -> SectionStatus {
        if self.is_complete() {
            SectionStatus::Complete
        } else if self.answered > 0 {
            SectionStatus::InProgress
        } else {
            SectionStatus::NotStarted
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.answered as f64 / self.total as f64
    }
}

/// Progress across the whole bank, recomputed from the store on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub sections: Vec<SectionProgress>,
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    #[must_use]
    pub fn compute(bank: &QuestionBank, store: &ResponseStore) -> Self {
        let sections: Vec<_> = bank
            .sections()
            .iter()
            .map(|section| SectionProgress::compute(section, store))
            .collect();
        let answered = sections.iter().map(|s| s.answered).sum();
        let total = sections.iter().map(|s| s.total).sum();
        Self {
            sections,
            answered,
            total,
        }
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&SectionProgress> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Names of sections whose answered count equals their length, in bank order.
    pub fn completed_sections(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .filter(|s| s.is_complete())
            .map(|s| s.name.as_str())
    }

    pub fn incomplete_sections(&self) -> impl Iterator<Item = &SectionProgress> {
        self.sections.iter().filter(|s| !s.is_complete())
    }

    #[must_use]
    pub fn all_complete(&self) -> bool {
        self.sections.iter().all(SectionProgress::is_complete)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.answered as f64 / self.total as f64
    }
}
