//! Reply composition.

use crate::base::types::Reference;

/// Format references as a 1-indexed list of `N. [title]: url` lines, in order.
pub fn format_references(references: &[Reference]) -> String {
    references
        .iter()
        .enumerate()
        .map(|(i, reference)| format!("{}. [{}]: {}", i + 1, reference.title, reference.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compose the reply posted to the thread.
///
/// The translated answer, the original answer and the reference list are
/// separated by blank lines.  The reference section is left out entirely when
/// there are no references.
pub fn compose_reply(translated_answer: &str, answer: &str, references: &[Reference]) -> String {
    let mut sections = vec![translated_answer.to_string(), answer.to_string()];

    if !references.is_empty() {
        sections.push(format_references(references));
    }

    sections.join("\n\n")
}

// Tests.
