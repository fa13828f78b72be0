//! Prompt builders and response contracts for the three pipeline stages.

use deck_core::{GenerationSettings, PlanEntry, Slide, SlideCount};
use serde::Deserialize;
use serde_json::{json, Value};

/// Fixed placeholder used when note generation fails. Stage C degrades to
/// this string instead of surfacing an error.
pub const NOTES_FALLBACK: &str = "Unable to generate speaker notes.";

/// Structured payload requested by the plan stage.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slides: Vec<PlanEntry>,
}

/// Structured payload requested by the content stage.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
    #[serde(default)]
    pub slides: Vec<Slide>,
}

/// Natural-language instruction for the plan stage.
pub fn plan_prompt(topic: &str, settings: &GenerationSettings) -> String {
    let slide_count_text = match settings.slide_count {
        SlideCount::Auto => "between 5 and 8 slides".to_string(),
        SlideCount::Exact(count) => format!("exactly {count} slides"),
    };

    let mut prompt = format!(
        "Generate a detailed plan for a {style} presentation on the topic: \"{topic}\".\n\
         The plan must contain {slide_count_text}.\n\
         Style: {style}\n\
         Detail level: {detail}\n",
        style = settings.presentation_style,
        detail = settings.detail_level,
    );
    if settings.include_title_slide {
        prompt.push_str("Include a title slide.\n");
    }
    if settings.include_conclusion {
        prompt.push_str("Include a conclusion slide.\n");
    }
    prompt.push_str(
        "\nFor each slide, provide a catchy title and a detailed description of its content.",
    );
    prompt
}

/// Response schema for the plan stage: `{title, slides: [{title, description}]}`.
pub fn plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "slides": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "propertyOrdering": ["title", "description"]
                }
            }
        },
        "propertyOrdering": ["title", "slides"]
    })
}

/// Natural-language instruction for the content stage, flattening the
/// (possibly user-edited) plan into one text block.
pub fn content_prompt(plan: &[PlanEntry], generate_speaker_notes: bool) -> String {
    let plan_text = plan
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "Slide {}: {}\nContent: {}",
                index + 1,
                entry.title,
                entry.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut prompt = format!(
        "Generate the detailed content for each slide based on this plan:\n\n\
         {plan_text}\n\n\
         For each slide, create rich markdown content with:\n\
         - Appropriate headings (use ## for subtitles and ### for sub-subtitles)\n\
         - Bullet lists where useful (use * for lists)\n\
         - Formatting (bold with **, italic with *)\n\
         - Informative and engaging content\n"
    );
    if generate_speaker_notes {
        prompt.push_str("\nAlso include speaker notes for each slide.");
    }
    prompt
}

/// Response schema for the content stage:
/// `{slides: [{title, content, speakerNotes}]}`.
pub fn content_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "slides": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "content": { "type": "STRING" },
                        "speakerNotes": { "type": "STRING" }
                    },
                    "propertyOrdering": ["title", "content", "speakerNotes"]
                }
            }
        }
    })
}

/// Free-text instruction for per-slide speaker notes.
pub fn notes_prompt(slide_title: &str, slide_content: &str) -> String {
    format!(
        "Generate speaker notes for this slide:\n\n\
         Title: {slide_title}\n\
         Content: {slide_content}\n\n\
         The notes must be concise, useful to the presenter, and include:\n\
         - Key points to mention\n\
         - Transitions to the next slide\n\
         - Examples or anecdotes to share\n\
         - Estimated presentation time"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{DetailLevel, PresentationStyle};

    #[test]
    fn plan_prompt_embeds_count_style_and_directives() {
        let mut settings = GenerationSettings::default();
        let auto = plan_prompt("History of coffee", &settings);
        assert!(auto.contains("between 5 and 8 slides"));
        assert!(auto.contains("\"History of coffee\""));
        assert!(auto.contains("Include a title slide."));
        assert!(auto.contains("Include a conclusion slide."));

        settings.set_slide_count(12);
        settings.include_conclusion = false;
        settings.include_title_slide = false;
        settings.presentation_style = PresentationStyle::Technical;
        settings.detail_level = DetailLevel::Detailed;
        let custom = plan_prompt("Rust ownership", &settings);
        assert!(custom.contains("exactly 12 slides"));
        assert!(custom.contains("technical presentation"));
        assert!(custom.contains("Detail level: detailed"));
        assert!(!custom.contains("Include a conclusion slide."));
        assert!(!custom.contains("Include a title slide."));
    }

    #[test]
    fn content_prompt_enumerates_plan_in_order() {
        let plan = vec![
            PlanEntry::new("Origins", "Where coffee comes from"),
            PlanEntry::new("Trade", "How it spread"),
        ];
        let prompt = content_prompt(&plan, true);
        assert!(prompt.contains("Slide 1: Origins\nContent: Where coffee comes from"));
        assert!(prompt.contains("Slide 2: Trade\nContent: How it spread"));
        assert!(prompt.contains("speaker notes"));

        let without_notes = content_prompt(&plan, false);
        assert!(!without_notes.contains("speaker notes"));
    }

    #[test]
    fn plan_response_tolerates_missing_fields() {
        let empty: PlanResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.title.is_none());
        assert!(empty.slides.is_empty());

        let full: PlanResponse = serde_json::from_str(
            r#"{"title":"T","slides":[{"title":"a","description":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(full.title.as_deref(), Some("T"));
        assert_eq!(full.slides.len(), 1);
    }

    #[test]
    fn content_response_parses_speaker_notes() {
        let parsed: ContentResponse = serde_json::from_str(
            r#"{"slides":[{"title":"a","content":"c","speakerNotes":"n"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.slides[0].speaker_notes.as_deref(), Some("n"));
    }

    #[test]
    fn schemas_request_object_shaped_json() {
        assert_eq!(plan_schema()["type"], "OBJECT");
        assert_eq!(
            plan_schema()["properties"]["slides"]["items"]["propertyOrdering"][0],
            "title"
        );
        assert_eq!(
            content_schema()["properties"]["slides"]["items"]["properties"]["speakerNotes"]
                ["type"],
            "STRING"
        );
    }
}
