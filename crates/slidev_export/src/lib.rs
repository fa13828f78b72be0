//! slidev_export - Slidev markdown deck rendering
//!
//! Pure transform from the in-memory slide list to a Slidev document: a
//! front-matter header, a title slide, then one section per slide separated
//! by horizontal rules. Slide content passes through verbatim; speaker notes
//! render as a two-column section beneath their slide. No I/O, no network.

use deck_core::Slide;

const FALLBACK_TITLE: &str = "Presentation";

/// Render a slide deck as a Slidev markdown document.
///
/// Deterministic: identical input yields byte-identical output.
pub fn render_deck(slides: &[Slide], title: &str) -> String {
    let title = if title.is_empty() { FALLBACK_TITLE } else { title };

    let mut deck = format!(
        r#"---
theme: default
background: https://source.unsplash.com/1920x1080/?technology
class: text-center
highlighter: shiki
lineNumbers: false
info: |
  ## {title}

  Presentation generated with Gemini AI
drawings:
  persist: false
transition: slide-left
title: {title}
---

# {title}

Generated with Gemini AI

---

"#
    );

    for slide in slides {
        deck.push_str(&format!("# {}\n\n{}\n\n", slide.title, slide.content));

        if let Some(notes) = slide.speaker_notes.as_deref().filter(|n| !n.is_empty()) {
            deck.push_str(&format!(
                "---\nlayout: two-cols\n\n# Speaker notes\n\n{notes}\n\n::right::\n\n"
            ));
        }

        deck.push_str("---\n\n");
    }

    deck
}

/// File name for a downloaded deck: the title lowercased with every
/// non-alphanumeric character replaced by an underscore.
pub fn export_filename(title: &str) -> String {
    let title = if title.is_empty() { FALLBACK_TITLE } else { title };
    let stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.md")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(title: &str, content: &str) -> Slide {
        Slide::new(title, content)
    }

    fn noted(title: &str, content: &str, notes: &str) -> Slide {
        let mut s = Slide::new(title, content);
        s.speaker_notes = Some(notes.to_string());
        s
    }

    /// Rule-delimited sections, excluding the front-matter block and the
    /// trailing remainder.
    fn section_count(deck: &str) -> usize {
        deck.split("\n---\n").count().saturating_sub(2)
    }

    #[test]
    fn deck_has_title_slide_plus_one_section_per_slide() {
        let slides = vec![
            slide("One", "* a"),
            slide("Two", "* b"),
            slide("Three", "* c"),
        ];
        let deck = render_deck(&slides, "Demo");
        assert_eq!(section_count(&deck), slides.len() + 1);
    }

    #[test]
    fn rendering_is_byte_stable() {
        let slides = vec![slide("One", "* a"), noted("Two", "* b", "say b")];
        assert_eq!(render_deck(&slides, "Demo"), render_deck(&slides, "Demo"));
    }

    #[test]
    fn front_matter_carries_theme_and_title() {
        let deck = render_deck(&[slide("One", "x")], "My Deck");
        assert!(deck.starts_with("---\ntheme: default\n"));
        assert!(deck.contains("transition: slide-left\n"));
        assert!(deck.contains("title: My Deck\n"));
        assert!(deck.contains("# My Deck\n"));
    }

    #[test]
    fn content_passes_through_verbatim() {
        let content = "## Sub\n\n* **bold** and *italic*\n* <raw> & unescaped";
        let deck = render_deck(&[slide("Raw", content)], "T");
        assert!(deck.contains(content));
    }

    #[test]
    fn speaker_notes_render_as_two_column_section() {
        let deck = render_deck(&[noted("One", "x", "mention the demo")], "T");
        assert!(deck.contains("layout: two-cols\n"));
        assert!(deck.contains("# Speaker notes\n\nmention the demo\n"));
        assert!(deck.contains("::right::\n"));
    }

    #[test]
    fn absent_notes_emit_no_notes_section() {
        let deck = render_deck(&[slide("One", "x")], "T");
        assert!(!deck.contains("layout: two-cols"));
        assert!(!deck.contains("::right::"));
    }

    #[test]
    fn empty_title_falls_back() {
        let deck = render_deck(&[slide("One", "x")], "");
        assert!(deck.contains("title: Presentation\n"));
    }

    #[test]
    fn filenames_are_lowercased_with_underscores() {
        assert_eq!(export_filename("History of Coffee!"), "history_of_coffee_.md");
        assert_eq!(export_filename(""), "presentation.md");
    }
}
