//! Report layout — content ideas → logical lines → positioned lines on A4 pages.
//!
//! Kept free of any PDF types so the whole layout can be asserted on in tests;
//! `render::pdf` only draws what `paginate` returns.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::models::content::ContentIdeas;
use crate::render::font_metrics::{get_metrics, ReportFont, PT_PER_MM};
use crate::render::sanitize::sanitize_text;

pub const EMPTY_REPORT_NOTICE: &str = "No content ideas were generated.";

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

/// A4 portrait with 15mm margins.
pub const A4: PageGeometry = PageGeometry {
    width_mm: 210.0,
    height_mm: 297.0,
    margin_mm: 15.0,
};

impl PageGeometry {
    fn text_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Line styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineStyle {
    Title,
    Section,
    Label,
    Body,
}

impl LineStyle {
    pub fn font(self) -> ReportFont {
        match self {
            LineStyle::Body => ReportFont::Helvetica,
            _ => ReportFont::HelveticaBold,
        }
    }

    pub fn font_size_pt(self) -> f32 {
        match self {
            LineStyle::Title => 16.0,
            LineStyle::Section => 14.0,
            LineStyle::Label | LineStyle::Body => 12.0,
        }
    }

    fn line_height_mm(self) -> f32 {
        match self {
            LineStyle::Title => 10.0,
            LineStyle::Section => 9.0,
            LineStyle::Label | LineStyle::Body => 6.0,
        }
    }

    fn space_before_mm(self) -> f32 {
        match self {
            LineStyle::Title => 0.0,
            LineStyle::Section => 6.0,
            LineStyle::Label => 2.0,
            LineStyle::Body => 0.0,
        }
    }
}

/// One logical (unwrapped) line of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub style: LineStyle,
    pub text: String,
    /// Continuation lines of a wrapped item are indented by this much.
    pub hang_indent_mm: f32,
}

/// A wrapped line with its baseline position on a page (origin bottom-left).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub style: LineStyle,
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Logical layout
// ────────────────────────────────────────────────────────────────────────────

struct Lines(Vec<ReportLine>);

impl Lines {
    fn push(&mut self, style: LineStyle, text: impl AsRef<str>) {
        self.0.push(ReportLine {
            style,
            text: sanitize_text(text.as_ref()),
            hang_indent_mm: 0.0,
        });
    }

    fn item(&mut self, text: impl AsRef<str>) {
        self.0.push(ReportLine {
            style: LineStyle::Body,
            text: sanitize_text(text.as_ref()),
            hang_indent_mm: 4.0,
        });
    }
}

/// Builds the report's logical lines. Platforms with nothing to show are omitted.
pub fn layout_report<Tz>(ideas: &ContentIdeas, generated_at: &DateTime<Tz>) -> Vec<ReportLine>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut lines = Lines(Vec::new());
    lines.push(
        LineStyle::Title,
        format!(
            "Content Ideas Summary - {}",
            generated_at.format("%d %b %Y %H:%M")
        ),
    );

    if ideas.is_empty() {
        lines.push(LineStyle::Body, EMPTY_REPORT_NOTICE);
        return lines.0;
    }

    if !ideas.youtube_video_ideas.is_empty() {
        lines.push(LineStyle::Section, "YouTube");
        for (i, video) in ideas.youtube_video_ideas.iter().enumerate() {
            lines.push(LineStyle::Label, format!("Idea {}:", i + 1));
            lines.item(format!("Title: {}", video.title));
            lines.item(format!("Hook: {}", video.hook));
            if !video.bullet_points.is_empty() {
                lines.push(LineStyle::Body, "Bullet Points:");
                for point in &video.bullet_points {
                    lines.item(format!("- {point}"));
                }
            }
        }
    }

    if !ideas.linkedin_posts.is_empty() {
        lines.push(LineStyle::Section, "LinkedIn");
        for (i, post) in ideas.linkedin_posts.iter().enumerate() {
            if ideas.linkedin_posts.len() > 1 {
                lines.push(LineStyle::Label, format!("Post {}:", i + 1));
            }
            for paragraph in post.split('\n').filter(|p| !p.trim().is_empty()) {
                lines.push(LineStyle::Body, paragraph);
            }
        }
    }

    if !ideas.twitter_posts.is_empty() || !ideas.twitter_threads.is_empty() {
        lines.push(LineStyle::Section, "Twitter");
        if !ideas.twitter_posts.is_empty() {
            lines.push(LineStyle::Label, "Tweets:");
            for (i, tweet) in ideas.twitter_posts.iter().enumerate() {
                lines.item(format!("- {}: {tweet}", i + 1));
            }
        }
        for (i, thread) in ideas.twitter_threads.iter().enumerate() {
            lines.push(LineStyle::Label, format!("Thread {}: {}", i + 1, thread.title));
            for tweet in &thread.tweets {
                lines.item(format!("- {tweet}"));
            }
        }
    }

    if !ideas.instagram_reels.is_empty() || !ideas.instagram_posts.is_empty() {
        lines.push(LineStyle::Section, "Instagram");
        if !ideas.instagram_reels.is_empty() {
            lines.push(LineStyle::Label, "Reel Ideas:");
            for (i, reel) in ideas.instagram_reels.iter().enumerate() {
                lines.item(format!("- Idea {}: {}", i + 1, reel.idea));
                lines.item(format!("  Style: {}", reel.caption_style));
            }
        }
        if !ideas.instagram_posts.is_empty() {
            lines.push(LineStyle::Label, "Post Captions:");
            for (i, post) in ideas.instagram_posts.iter().enumerate() {
                lines.item(format!("- {}: {post}", i + 1));
            }
        }
    }

    lines.0
}

// ────────────────────────────────────────────────────────────────────────────
// Wrapping + pagination
// ────────────────────────────────────────────────────────────────────────────

/// Wraps every logical line to the text width and assigns page positions.
/// Always returns at least one page.
pub fn paginate(lines: &[ReportLine], page: &PageGeometry) -> Vec<Vec<PlacedLine>> {
    let top = page.height_mm - page.margin_mm;
    let bottom = page.margin_mm;

    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    let mut cursor = top;

    for line in lines {
        let metrics = get_metrics(line.style.font());
        let size = line.style.font_size_pt();
        let mm_to_em = PT_PER_MM / size;

        let first_width = page.text_width_mm() * mm_to_em;
        let rest_width = (page.text_width_mm() - line.hang_indent_mm) * mm_to_em;

        let mut wrapped = metrics.wrap(&line.text, first_width);
        // Continuation lines are narrower; re-wrap everything after the first.
        if wrapped.len() > 1 && line.hang_indent_mm > 0.0 {
            let rest = wrapped[1..].join(" ");
            wrapped.truncate(1);
            wrapped.extend(metrics.wrap(&rest, rest_width));
        }

        let on_fresh_page = pages.last().is_some_and(|p| p.is_empty());
        if !on_fresh_page {
            cursor -= line.style.space_before_mm();
        }

        for (n, text) in wrapped.into_iter().enumerate() {
            cursor -= line.style.line_height_mm();
            if cursor < bottom {
                pages.push(Vec::new());
                cursor = top - line.style.line_height_mm();
            }
            let indent = if n == 0 { 0.0 } else { line.hang_indent_mm };
            if let Some(current) = pages.last_mut() {
                current.push(PlacedLine {
                    style: line.style,
                    text,
                    x_mm: page.margin_mm + indent,
                    y_mm: cursor,
                });
            }
        }
    }

    pages
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::content::{InstagramReel, TwitterThread, YouTubeIdea};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    fn texts(lines: &[ReportLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_empty_ideas_render_title_and_notice() {
        let lines = layout_report(&ContentIdeas::default(), &at());
        assert_eq!(
            texts(&lines),
            vec!["Content Ideas Summary - 19 Oct 2026 09:30", EMPTY_REPORT_NOTICE]
        );
        assert_eq!(lines[0].style, LineStyle::Title);
    }

    #[test]
    fn test_only_populated_sections_appear() {
        let ideas = ContentIdeas {
            linkedin_posts: vec!["x".to_string()],
            ..Default::default()
        };
        let lines = layout_report(&ideas, &at());
        let sections: Vec<&str> = lines
            .iter()
            .filter(|l| l.style == LineStyle::Section)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(sections, vec!["LinkedIn"]);
        assert_eq!(lines.last().unwrap().text, "x");
    }

    #[test]
    fn test_full_report_section_order_and_items() {
        let ideas = ContentIdeas {
            youtube_video_ideas: vec![YouTubeIdea {
                title: "T".to_string(),
                hook: "H".to_string(),
                bullet_points: vec!["b1".to_string()],
            }],
            twitter_posts: vec!["tw".to_string()],
            twitter_threads: vec![TwitterThread {
                title: "thr".to_string(),
                tweets: vec!["1/".to_string()],
            }],
            linkedin_posts: vec!["li".to_string()],
            instagram_reels: vec![InstagramReel {
                idea: "reel".to_string(),
                caption_style: "meme".to_string(),
            }],
            instagram_posts: vec!["cap".to_string()],
        };
        let lines = layout_report(&ideas, &at());

        assert_eq!(
            texts(&lines)[1..],
            [
                "YouTube",
                "Idea 1:",
                "Title: T",
                "Hook: H",
                "Bullet Points:",
                "- b1",
                "LinkedIn",
                "li",
                "Twitter",
                "Tweets:",
                "- 1: tw",
                "Thread 1: thr",
                "- 1/",
                "Instagram",
                "Reel Ideas:",
                "- Idea 1: reel",
                "  Style: meme",
                "Post Captions:",
                "- 1: cap",
            ]
        );
    }

    #[test]
    fn test_text_is_sanitized() {
        let ideas = ContentIdeas {
            twitter_posts: vec!["ship it 🚀 don\u{2019}t wait".to_string()],
            ..Default::default()
        };
        let lines = layout_report(&ideas, &at());
        assert!(texts(&lines).contains(&"- 1: ship it  don't wait"));
    }

    #[test]
    fn test_paginate_keeps_lines_inside_margins() {
        let long_post = "Zero trust is a budget line until the VPN falls over. ".repeat(200);
        let ideas = ContentIdeas {
            linkedin_posts: vec![long_post],
            ..Default::default()
        };
        let pages = paginate(&layout_report(&ideas, &at()), &A4);

        assert!(pages.len() > 1, "long post should spill onto another page");
        for line in pages.iter().flatten() {
            assert!(line.y_mm >= A4.margin_mm);
            assert!(line.y_mm <= A4.height_mm - A4.margin_mm);
            let width_em = get_metrics(line.style.font()).measure_str(&line.text);
            let width = width_em * line.style.font_size_pt() / PT_PER_MM;
            assert!(line.x_mm + width <= A4.width_mm - A4.margin_mm + 0.01);
        }
    }

    #[test]
    fn test_paginate_indents_continuation_lines() {
        let lines = vec![ReportLine {
            style: LineStyle::Body,
            text: "word ".repeat(80),
            hang_indent_mm: 4.0,
        }];
        let page = paginate(&lines, &A4).remove(0);
        assert!(page.len() > 1);
        assert_eq!(page[0].x_mm, A4.margin_mm);
        assert!(page[1..].iter().all(|l| l.x_mm == A4.margin_mm + 4.0));
    }

    #[test]
    fn test_paginate_empty_input_yields_one_blank_page() {
        let pages = paginate(&[], &A4);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }
}
