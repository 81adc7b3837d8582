//! Note document model.
//!
//! A note is a title line, a creation time line, then up to four sections in
//! a fixed order. Sections with no content are left out entirely.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// `strftime` pattern for note and attachment file stems.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const TITLE_PREFIX: &str = "Feishu Sync Note";

/// Everything collected for one incoming message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub text: Option<String>,
    pub image_links: Vec<String>,
    pub ocr_results: Vec<String>,
    pub ai_results: Vec<String>,
}

impl NoteDraft {
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty())
            && self.image_links.is_empty()
            && self.ocr_results.is_empty()
            && self.ai_results.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub level: usize,
    pub body: String,
}

impl Section {
    fn new(level: usize, heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            level,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// `YYYYMMDDHHMMSS`, also the preferred file stem.
    pub timestamp: String,
    pub title: String,
    pub created_at: String,
    pub sections: Vec<Section>,
}

impl Note {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n", self.title));
        out.push_str(&format!("Created: {}\n", self.created_at));
        for section in &self.sections {
            out.push('\n');
            out.push_str(&"#".repeat(section.level));
            out.push(' ');
            out.push_str(&section.heading);
            out.push('\n');
            if !section.body.is_empty() {
                out.push_str(section.body.trim_end_matches('\n'));
                out.push('\n');
            }
        }
        out
    }
}

pub fn timestamp_slug(now: NaiveDateTime) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Build the note for `draft` as of `now`.
pub fn assemble(draft: &NoteDraft, now: NaiveDateTime) -> Note {
    let timestamp = timestamp_slug(now);
    let mut sections = Vec::new();

    if let Some(text) = draft.text.as_deref().filter(|t| !t.trim().is_empty()) {
        sections.push(Section::new(2, "Original Text", text));
    }

    if !draft.image_links.is_empty() {
        sections.push(Section::new(2, "Images", draft.image_links.join("\n")));
    }

    push_results(&mut sections, "OCR Results", &draft.ocr_results, |n| {
        format!("Image {n} OCR Result")
    });
    push_results(&mut sections, "AI Analysis Results", &draft.ai_results, |n| {
        format!("Analysis {n}")
    });

    Note {
        title: format!("{TITLE_PREFIX} {timestamp}"),
        created_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        timestamp,
        sections,
    }
}

// A single result sits directly under the section heading; several get
// numbered subheadings.
fn push_results(
    sections: &mut Vec<Section>,
    heading: &str,
    results: &[String],
    subheading: impl Fn(usize) -> String,
) {
    match results {
        [] => {}
        [only] => sections.push(Section::new(2, heading, only.as_str())),
        many => {
            sections.push(Section::new(2, heading, ""));
            for (i, body) in many.iter().enumerate() {
                sections.push(Section::new(3, subheading(i + 1), body.as_str()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(9, 3, 7)
            .unwrap()
    }

    #[test]
    fn title_and_timestamp() {
        let note = assemble(&NoteDraft::default(), at());
        assert_eq!(note.timestamp, "20240517090307");
        let md = note.to_markdown();
        assert!(md.starts_with("# Feishu Sync Note 20240517090307\nCreated: 2024-05-17 09:03:07\n"));
    }

    #[test]
    fn sections_follow_fixed_order() {
        let draft = NoteDraft {
            text: Some("hello".into()),
            image_links: vec!["![[attachments/a.png]]".into()],
            ocr_results: vec!["ocr text".into()],
            ai_results: vec!["analysis".into()],
        };
        let md = assemble(&draft, at()).to_markdown();
        let positions: Vec<usize> = ["## Original Text", "## Images", "## OCR Results", "## AI Analysis Results"]
            .iter()
            .map(|h| md.find(h).unwrap_or_else(|| panic!("missing {h}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!md.contains("###"));
    }

    #[test]
    fn empty_inputs_omit_sections() {
        let draft = NoteDraft {
            text: Some("  ".into()),
            ocr_results: vec!["only ocr".into()],
            ..Default::default()
        };
        let md = assemble(&draft, at()).to_markdown();
        assert!(!md.contains("## Original Text"));
        assert!(!md.contains("## Images"));
        assert!(!md.contains("## AI Analysis Results"));
        assert!(md.contains("## OCR Results\nonly ocr\n"));
    }

    #[test]
    fn multiple_results_get_numbered_subheadings() {
        let draft = NoteDraft {
            ocr_results: vec!["first".into(), "second".into()],
            ai_results: vec!["a1".into(), "a2".into(), "a3".into()],
            ..Default::default()
        };
        let md = assemble(&draft, at()).to_markdown();
        assert!(md.contains("### Image 1 OCR Result\nfirst\n"));
        assert!(md.contains("### Image 2 OCR Result\nsecond\n"));
        assert!(md.contains("### Analysis 3\na3\n"));
        assert!(md.find("### Image 2").unwrap() < md.find("## AI Analysis Results").unwrap());
    }

    #[test]
    fn image_links_one_per_line() {
        let draft = NoteDraft {
            image_links: vec!["![[a/1.png]]".into(), "![[a/2.png]]".into()],
            ..Default::default()
        };
        let md = assemble(&draft, at()).to_markdown();
        assert!(md.contains("## Images\n![[a/1.png]]\n![[a/2.png]]\n"));
    }

    #[test]
    fn draft_emptiness() {
        assert!(NoteDraft::default().is_empty());
        assert!(NoteDraft { text: Some(" ".into()), ..Default::default() }.is_empty());
        assert!(!NoteDraft { ai_results: vec!["x".into()], ..Default::default() }.is_empty());
    }
}
