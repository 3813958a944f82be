//! Prompt Builder — every prompt the digest pipeline sends to the model.
//!
//! One content template serves every voice: `ContentStyle` swaps the voice
//! block and `brand` names the account. Pure string formatting, no side effects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::models::article::Article;

// ────────────────────────────────────────────────────────────────────────────
// Style
// ────────────────────────────────────────────────────────────────────────────

/// Voice used for generated content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStyle {
    /// Loud, roast-heavy, meme-literate. The brand's house voice.
    #[default]
    Savage,
    /// Measured practitioner voice for a wider professional audience.
    Professional,
    /// Teaching voice: explain the bug, then the fix.
    Educational,
}

impl ContentStyle {
    fn voice(self, brand: &str) -> String {
        match self {
            ContentStyle::Savage => format!(
                "You are the voice behind *{brand}*, a faceless, savage, unfiltered cybersecurity \
content brand that owns timelines and commands respect from hackers, red teamers, blue teamers \
and DevSecOps engineers.

No generic corporate cyber talk. Your content is:
- Loud where others whisper
- Deep where others skim
- Funny, brutal, and smart
- LinkedIn: speak like you got laid off from a unicorn startup and now write like a philosopher.
- Reels: short, punchy, should slap harder than a 0-day on prod.
- Twitter: roast vulnerabilities, inject humor, drop one-liners like reverse shells."
            ),
            ContentStyle::Professional => format!(
                "You are the content lead for *{brand}*, a cybersecurity threat intelligence brand \
read by security engineers, CISOs and incident responders.

Your content is:
- Precise and evidence-based; no hype, no fear-mongering
- Focused on impact, root cause and what defenders should do next
- LinkedIn: a seasoned practitioner sharing a lesson learned.
- Reels: crisp visual explainers.
- Twitter: sharp, factual, quotable."
            ),
            ContentStyle::Educational => format!(
                "You are the instructor behind *{brand}*, a cybersecurity education brand that turns \
breaking news into lessons.

Your content is:
- Clear enough for a junior analyst, deep enough for a senior one
- Always explains how the attack works and how to defend against it
- LinkedIn: a short case study with one takeaway.
- Reels: step-by-step visual breakdowns.
- Twitter: mini lessons and myth-busting."
            ),
        }
    }
}

impl fmt::Display for ContentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentStyle::Savage => "savage",
            ContentStyle::Professional => "professional",
            ContentStyle::Educational => "educational",
        })
    }
}

impl FromStr for ContentStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "savage" => Ok(ContentStyle::Savage),
            "professional" => Ok(ContentStyle::Professional),
            "educational" => Ok(ContentStyle::Educational),
            other => Err(format!("unknown content style '{other}'")),
        }
    }
}

/// Parameters of the single content template.
#[derive(Debug, Clone)]
pub struct ContentTemplate {
    pub style: ContentStyle,
    pub brand: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Templates
// ────────────────────────────────────────────────────────────────────────────

/// Content ideas prompt. Replace: {voice}, {news}, {json_only}
pub const CONTENT_PROMPT_TEMPLATE: &str = r#"{voice}

Your job is to convert the following high-signal cyber news into content for:

YouTube | Twitter | LinkedIn | Instagram

News:
{news}
Now generate ideas for each platform:

YOUTUBE (2 videos):
Each should include:
- "title": click-worthy but never a lie
- "hook": killer intro line (edgy, sarcastic, or dramatic)
- "bullet_points": key segments (walkthroughs, CVE chains, story arcs, live demo, defenses)

TWITTER/X:
- 5 tweets (punchy, educational, or quotable)
- 1-2 threads:
  - "title": story or guide title
  - "tweets": a mini course or hacker lore in 6 tweets or less

LINKEDIN (1 post):
- Real insight. No buzzwords. Tell a story. Drop a lesson.

INSTAGRAM:
- 2 REEL IDEAS:
  - "idea": a visual that can go viral (POV, hacker moment, exploit meme)
  - "caption_style": one of: meme | cinematic | sarcastic | educational
- 2 POST CAPTIONS:
  - 1-2 lines each

FORMAT:
Return JSON in exactly this structure:

{
  "linkedin_posts": ["string"],
  "youtube_video_ideas": [
    {
      "title": "string",
      "hook": "string",
      "bullet_points": ["string", "string", "string"]
    },
    {
      "title": "string",
      "hook": "string",
      "bullet_points": ["string", "string", "string"]
    }
  ],
  "instagram_reels": [
    {
      "idea": "string",
      "caption_style": "string"
    },
    {
      "idea": "string",
      "caption_style": "string"
    }
  ],
  "instagram_posts": ["string", "string"],
  "twitter_posts": ["string", "string", "string", "string", "string"],
  "twitter_threads": [
    {
      "title": "string",
      "tweets": ["string", "string", "string"]
    }
  ]
}

RULES:
{json_only}
- Every item must read like it came from someone who has been in the trenches, not someone reading headlines."#;

/// Comparative scoring prompt. Replace: {brand}, {articles_json}, {json_only}
pub const SCORING_PROMPT_TEMPLATE: &str = r#"You are a cybersecurity strategist working for the threat intel brand "{brand}".

You are given multiple real-world cybersecurity articles in JSON format. Evaluate and score them COMPARATIVELY across these criteria:

1. Relevance to current cybersecurity threats
2. Uniqueness and novelty
3. Technical depth (exploits, root cause, complexity)
4. Viral content potential (LinkedIn, YouTube, Twitter)
5. Actionability for defenders and researchers
6. Timeliness (emerging or trending issues)

TASK:
- Score each article RELATIVE to the others, not in isolation.
- Use whole-number scores from 1 (weak) to 10 (strong).
- Key each score by the article's position in the list: "Article 1" is the first article.

RESPONSE FORMAT:
{json_only}
- Output must match this exact format:

{"Article 1": 7, "Article 2": 9, "Article 3": 6}

Now here are the articles in JSON format:
{articles_json}
"#;

// ────────────────────────────────────────────────────────────────────────────
// Builders
// ────────────────────────────────────────────────────────────────────────────

/// One `- title: body` line per article, in the given order.
pub fn build_news_context<'a>(articles: impl IntoIterator<Item = &'a Article>) -> String {
    articles
        .into_iter()
        .map(|a| format!("- {}: {}\n", a.title, a.body))
        .collect()
}

/// Fills the content template for the given articles.
pub fn build_content_prompt<'a>(
    articles: impl IntoIterator<Item = &'a Article>,
    template: &ContentTemplate,
) -> String {
    CONTENT_PROMPT_TEMPLATE
        .replace("{voice}", &template.style.voice(&template.brand))
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{news}", &build_news_context(articles))
}

/// Fills the scoring template with the full article list serialized as JSON.
pub fn build_scoring_prompt(articles: &[Article], brand: &str) -> Result<String, AppError> {
    let articles_json = serde_json::to_string_pretty(articles)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize articles: {e}")))?;

    Ok(SCORING_PROMPT_TEMPLATE
        .replace("{brand}", brand)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{articles_json}", &articles_json))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: i64, title: &str, body: &str) -> Article {
        Article {
            id,
            title: title.to_string(),
            body: body.to_string(),
            url: format!("https://news.example/{id}"),
        }
    }

    #[test]
    fn test_news_context_one_line_per_article_in_order() {
        let articles = vec![
            article(1, "Ivanti zero-day", "Exploited in the wild."),
            article(2, "XZ backdoor", "Supply chain compromise."),
        ];
        assert_eq!(
            build_news_context(&articles),
            "- Ivanti zero-day: Exploited in the wild.\n- XZ backdoor: Supply chain compromise.\n"
        );
    }

    #[test]
    fn test_content_prompt_fills_every_placeholder() {
        let articles = vec![article(1, "Ivanti zero-day", "Exploited in the wild.")];
        let template = ContentTemplate {
            style: ContentStyle::Savage,
            brand: "pwnspectrum".to_string(),
        };
        let prompt = build_content_prompt(&articles, &template);

        assert!(prompt.contains("*pwnspectrum*"));
        assert!(prompt.contains("- Ivanti zero-day: Exploited in the wild."));
        assert!(prompt.contains("\"youtube_video_ideas\""));
        assert!(prompt.contains("triple backticks"));
        assert!(!prompt.contains("{voice}"));
        assert!(!prompt.contains("{news}"));
        assert!(!prompt.contains("{json_only}"));
    }

    #[test]
    fn test_style_changes_voice_only() {
        let articles = vec![article(1, "t", "b")];
        let savage = build_content_prompt(
            &articles,
            &ContentTemplate {
                style: ContentStyle::Savage,
                brand: "b".to_string(),
            },
        );
        let educational = build_content_prompt(
            &articles,
            &ContentTemplate {
                style: ContentStyle::Educational,
                brand: "b".to_string(),
            },
        );
        assert_ne!(savage, educational);
        assert!(educational.contains("turns breaking news into lessons"));
        assert!(savage.ends_with(educational.lines().last().unwrap()));
    }

    #[test]
    fn test_scoring_prompt_embeds_articles_as_json() {
        let articles = vec![article(7, "A", "alpha"), article(8, "B", "beta")];
        let prompt = build_scoring_prompt(&articles, "pwnspectrum").unwrap();

        assert!(prompt.contains("\"pwnspectrum\""));
        assert!(prompt.contains("\"content\": \"alpha\""));
        assert!(prompt.contains("\"id\": 8"));
        assert!(prompt.contains(r#"{"Article 1": 7, "Article 2": 9, "Article 3": 6}"#));
        assert!(!prompt.contains("{articles_json}"));
    }

    #[test]
    fn test_content_style_parses_case_insensitively() {
        assert_eq!("Savage".parse::<ContentStyle>().unwrap(), ContentStyle::Savage);
        assert_eq!(
            " EDUCATIONAL ".parse::<ContentStyle>().unwrap(),
            ContentStyle::Educational
        );
        assert!("corporate".parse::<ContentStyle>().is_err());
    }

    #[test]
    fn test_content_style_serde_is_lowercase() {
        let style: ContentStyle = serde_json::from_str(r#""professional""#).unwrap();
        assert_eq!(style, ContentStyle::Professional);
        assert_eq!(serde_json::to_string(&ContentStyle::Savage).unwrap(), r#""savage""#);
    }
}
