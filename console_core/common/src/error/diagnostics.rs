use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

/// Error text plus the source position that raised it.
///
/// Built through `#[track_caller]` constructors, so the position is the
/// first caller outside the error helpers, not this file. `Display` renders
/// `message (at file:line)`; [`DiagnosticMessage::message`] gives the bare
/// text for anything shown to end users.
#[derive(Clone, Debug)]
pub struct DiagnosticMessage {
    text: Cow<'static, str>,
    origin: &'static Location<'static>,
}

impl DiagnosticMessage {
    #[track_caller]
    pub fn new(text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            text: text.into(),
            origin: Location::caller(),
        }
    }

    pub fn message(&self) -> &str {
        &self.text
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.origin
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = self.origin;
        write!(f, "{} (at {}:{})", self.text, origin.file(), origin.line())
    }
}

impl From<&'static str> for DiagnosticMessage {
    #[track_caller]
    fn from(text: &'static str) -> Self {
        Self::new(text)
    }
}

impl From<String> for DiagnosticMessage {
    #[track_caller]
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
