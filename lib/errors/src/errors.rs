use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
};

use cursor::Line;
use itertools::Itertools;

/// A compile-time problem (lexical or syntax) in a form that can be shown to the user.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("[line {line}] Error{}: {message}", .at.as_ref().map(|at| format!(" at {at}")).unwrap_or_default())]
pub struct Diagnostic {
    pub line: Line,
    /// Where on the line the error happened, e.g. `'('` or `end`.
    pub at: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: Line, message: impl ToString) -> Self {
        Self { line, at: None, message: message.to_string() }
    }

    pub fn at(mut self, at: impl ToString) -> Self {
        self.at = Some(at.to_string());
        self
    }
}

#[derive(thiserror::Error, Clone, Debug, Default, PartialEq)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl From<Diagnostic> for Diagnostics {
    fn from(e: Diagnostic) -> Self {
        Self(vec![e])
    }
}

impl<D: Into<Diagnostic>> FromIterator<D> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = D>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<D: Into<Diagnostic>> Extend<D> for Diagnostics {
    fn extend<T: IntoIterator<Item = D>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(Into::into))
    }
}

impl Deref for Diagnostics {
    type Target = Vec<Diagnostic>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Diagnostics {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn display_with_and_without_location() {
        let plain = Diagnostic::new(Line(3), "Unterminated string.");
        assert_eq!(plain.to_string(), "[line 3] Error: Unterminated string.");

        let at = Diagnostic::new(Line(1), "Expect expression.").at("'+'");
        assert_eq!(at.to_string(), "[line 1] Error at '+': Expect expression.");
    }

    #[test]
    fn diagnostics_are_joined_by_newlines() {
        let mut diagnostics = Diagnostics::default();
        assert!(diagnostics.is_empty());

        diagnostics.extend([
            Diagnostic::new(Line(1), "first"),
            Diagnostic::new(Line(2), "second").at("end"),
        ]);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics.to_string(),
            "[line 1] Error: first\n[line 2] Error at end: second"
        );
    }
}
