//! Generated document model and its flattened field view

use crate::html::strip_html;
use serde::{Deserialize, Serialize};

/// An HTML block with its plain-text rendition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Rendered HTML
    #[serde(default)]
    pub html: String,

    /// Plain-text rendition
    #[serde(default)]
    pub plain_text: String,
}

impl Block {
    /// Create a block from HTML, deriving the plain text
    pub fn from_html(html: impl Into<String>) -> Self {
        let html = html.into();
        let plain_text = strip_html(&html);
        Self { html, plain_text }
    }
}

/// One body section of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section heading (H2 text)
    #[serde(default)]
    pub heading: String,

    /// Rendered HTML body
    #[serde(default)]
    pub html: String,

    /// Plain-text rendition
    #[serde(default)]
    pub plain_text: String,
}

impl Section {
    /// Create a section from a heading and HTML body, deriving the plain text
    pub fn new(heading: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let plain_text = strip_html(&html);
        Self {
            heading: heading.into(),
            html,
            plain_text,
        }
    }
}

/// A generated long-form document
///
/// This is the boundary shape exchanged with the orchestrator and the
/// rendering collaborator. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Article title
    #[serde(default)]
    pub title: String,

    /// Meta description
    #[serde(default)]
    pub meta_description: String,

    /// Introduction block
    #[serde(default)]
    pub introduction: Option<Block>,

    /// Body sections in order
    #[serde(default)]
    pub sections: Vec<Section>,

    /// Conclusion block
    #[serde(default)]
    pub conclusion: Option<Block>,
}

/// Kind of a content field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Raw HTML markup
    Html,
    /// Plain text
    PlainText,
}

/// One named slice of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentField {
    /// Dotted field path (e.g. `content.sections[0].html`)
    pub name: String,

    /// Whether `value` is markup or plain text
    pub kind: FieldKind,

    /// Raw field value (HTML is kept unstripped so markup rules can see it)
    pub value: String,
}

impl ContentField {
    /// Text with markup removed; plain-text fields are only trimmed
    pub fn text(&self) -> String {
        match self.kind {
            FieldKind::Html => strip_html(&self.value),
            FieldKind::PlainText => self.value.trim().to_string(),
        }
    }
}

impl Document {
    /// Flatten the document into its non-empty content fields
    ///
    /// Order is stable: title, meta description, introduction, each section
    /// (heading, html, plain text), conclusion.
    pub fn fields(&self) -> Vec<ContentField> {
        let mut fields = Vec::new();

        push_field(&mut fields, "title", &self.title, FieldKind::PlainText);
        push_field(
            &mut fields,
            "meta_description",
            &self.meta_description,
            FieldKind::PlainText,
        );

        if let Some(intro) = &self.introduction {
            push_field(&mut fields, "content.introduction.html", &intro.html, FieldKind::Html);
            push_field(
                &mut fields,
                "content.introduction.plain_text",
                &intro.plain_text,
                FieldKind::PlainText,
            );
        }

        for (idx, section) in self.sections.iter().enumerate() {
            push_field(
                &mut fields,
                &format!("content.sections[{}].heading", idx),
                &section.heading,
                FieldKind::PlainText,
            );
            push_field(
                &mut fields,
                &format!("content.sections[{}].html", idx),
                &section.html,
                FieldKind::Html,
            );
            push_field(
                &mut fields,
                &format!("content.sections[{}].plain_text", idx),
                &section.plain_text,
                FieldKind::PlainText,
            );
        }

        if let Some(conclusion) = &self.conclusion {
            push_field(&mut fields, "content.conclusion.html", &conclusion.html, FieldKind::Html);
            push_field(
                &mut fields,
                "content.conclusion.plain_text",
                &conclusion.plain_text,
                FieldKind::PlainText,
            );
        }

        fields
    }

    /// Apply a rewrite to every HTML body and re-derive the plain text
    ///
    /// Used by the scrub pass so `plain_text` never drifts from `html`.
    pub fn map_html<F>(&mut self, mut rewrite: F)
    where
        F: FnMut(&str) -> String,
    {
        if let Some(intro) = self.introduction.as_mut() {
            *intro = Block::from_html(rewrite(&intro.html));
        }
        for section in &mut self.sections {
            section.html = rewrite(&section.html);
            section.plain_text = strip_html(&section.html);
        }
        if let Some(conclusion) = self.conclusion.as_mut() {
            *conclusion = Block::from_html(rewrite(&conclusion.html));
        }
    }
}

fn push_field(fields: &mut Vec<ContentField>, name: &str, value: &str, kind: FieldKind) {
    // Markup with no visible text still carries tags the rules look for.
    let value = match kind {
        FieldKind::Html if value.trim().is_empty() => return,
        FieldKind::Html => value.to_string(),
        FieldKind::PlainText => value.trim().to_string(),
    };
    if value.is_empty() {
        return;
    }
    fields.push(ContentField {
        name: name.to_string(),
        kind,
        value,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        Document {
            title: "東京自由行".to_string(),
            meta_description: "  ".to_string(),
            introduction: Some(Block::from_html("<p>開場</p>")),
            sections: vec![Section::new("行程", "<h3>Day1：淺草</h3><p>散步</p>")],
            conclusion: None,
        }
    }

    #[test]
    fn test_fields_skip_empty_values() {
        let fields = sample_document().fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "title",
                "content.introduction.html",
                "content.introduction.plain_text",
                "content.sections[0].heading",
                "content.sections[0].html",
                "content.sections[0].plain_text",
            ]
        );
    }

    #[test]
    fn test_markup_only_html_field_is_kept() {
        let doc = Document {
            sections: vec![Section::new("延伸閱讀", "<a href=\"https://x.example\"></a>")],
            ..Default::default()
        };
        let fields = doc.fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["content.sections[0].heading", "content.sections[0].html"]);
        assert!(fields[1].value.contains("<a href"));
        assert!(fields[1].text().is_empty());
    }

    #[test]
    fn test_html_field_keeps_markup() {
        let fields = sample_document().fields();
        let html = fields
            .iter()
            .find(|f| f.name == "content.sections[0].html")
            .unwrap();

        assert_eq!(html.kind, FieldKind::Html);
        assert!(html.value.contains("<h3>"));
        assert!(!html.text().contains("<h3>"));
    }

    #[test]
    fn test_map_html_rederives_plain_text() {
        let mut doc = sample_document();
        doc.map_html(|html| html.replace("淺草", "上野"));

        assert!(doc.sections[0].html.contains("上野"));
        assert!(doc.sections[0].plain_text.contains("上野"));
        assert!(doc.introduction.unwrap().plain_text.contains("開場"));
    }

    #[test]
    fn test_document_deserializes_with_missing_fields() {
        let doc: Document = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(doc.title, "x");
        assert!(doc.sections.is_empty());
        assert!(doc.introduction.is_none());
    }
}
