use serde::Serialize;

/// Identifier of a synthesized anchor. Ids start at 1 and follow document order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct AnchorId(pub u32);

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Document {
    pub title: Option<String>,
    pub parts: Vec<DocPart>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending_references(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, DocPart::PendingReference(_)))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingLevel {
    Title,
    Caption,
    SubCaption,
    SubSubCaption,
}

impl HeadingLevel {
    /// 1 for the title down to 4 for sub-sub-captions.
    pub fn rank(self) -> u8 {
        match self {
            HeadingLevel::Title => 1,
            HeadingLevel::Caption => 2,
            HeadingLevel::SubCaption => 3,
            HeadingLevel::SubSubCaption => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum DocPart {
    PlainText(String),
    StyledText {
        text: String,
        bold: bool,
        italic: bool,
    },
    Heading {
        level: HeadingLevel,
        text: String,
    },
    Image {
        name: String,
    },
    LinkTarget(AnchorId),
    Link {
        target: AnchorId,
        text: String,
    },
    ExternalLink {
        url: String,
        text: String,
    },
    PendingReference(PendingReference),
}

impl DocPart {
    pub fn text(text: impl Into<String>) -> Self {
        DocPart::PlainText(text.into())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DocPart::PlainText(_) => "PlainText",
            DocPart::StyledText { .. } => "StyledText",
            DocPart::Heading { .. } => "Heading",
            DocPart::Image { .. } => "Image",
            DocPart::LinkTarget(_) => "LinkTarget",
            DocPart::Link { .. } => "Link",
            DocPart::ExternalLink { .. } => "ExternalLink",
            DocPart::PendingReference(_) => "PendingReference",
        }
    }
}

/// A bracketed reference that has not been classified yet.
///
/// Only exists between parsing and resolution; `text` is empty when the
/// reference had no explicit display text.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PendingReference {
    pub target: String,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl PendingReference {
    pub fn display_text(&self) -> &str {
        if self.text.is_empty() {
            &self.target
        } else {
            &self.text
        }
    }
}
