use serde::{Deserialize, Serialize};

/// A single questionnaire prompt.
///
/// `index` is the zero-based position inside the owning section and defines
/// navigation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    text: String,
    context: Option<String>,
    category: Option<String>,
    index: usize,
}

impl Question {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        context: Option<String>,
        category: Option<String>,
        index: usize,
    ) -> Self {
        Self {
            text: text.into(),
            context,
            category,
            index,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Named, ordered group of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    questions: Vec<Question>,
}

impl Section {
    /// Build a section, assigning positional indices to the given entries.
    #[must_use]
    pub fn new<I>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>, Option<String>)>,
    {
        let questions = entries
            .into_iter()
            .enumerate()
            .map(|(index, (text, context, category))| {
                Question::new(text, context, category, index)
            })
            .collect();
        Self {
            name: name.into(),
            questions,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// The loaded questionnaire: sections in document order.
///
/// Immutable after load. Whether a question is answered is never stored
/// here; it is derived from the `ResponseStore`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionBank {
    sections: Vec<Section>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    #[must_use]
    pub fn question(&self, section: &str, index: usize) -> Option<&Question> {
        self.section(section).and_then(|s| s.question(index))
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(Section::name)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_questions() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> (String, Option<String>, Option<String>) {
        (text.to_owned(), None, None)
    }

    #[test]
    fn section_assigns_positional_indices() {
        let section = Section::new("Company", vec![entry("Name?"), entry("Size?")]);
        assert_eq!(section.len(), 2);
        assert_eq!(section.question(1).map(Question::index), Some(1));
        assert_eq!(section.question(1).map(Question::text), Some("Size?"));
    }

    #[test]
    fn bank_counts_questions_across_sections() {
        let bank = QuestionBank::new(vec![
            Section::new("Company", vec![entry("a"), entry("b")]),
            Section::new("Security", vec![entry("c")]),
        ]);
        assert_eq!(bank.total_questions(), 3);
        assert_eq!(
            bank.section_names().collect::<Vec<_>>(),
            vec!["Company", "Security"]
        );
        assert!(bank.question("Security", 1).is_none());
    }
}
