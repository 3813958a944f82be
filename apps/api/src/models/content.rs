use serde::{Deserialize, Serialize};

/// Every top-level key a `ContentIdeas` JSON object may carry.
pub const CONTENT_IDEAS_FIELDS: [&str; 6] = [
    "youtube_video_ideas",
    "twitter_posts",
    "twitter_threads",
    "linkedin_posts",
    "instagram_reels",
    "instagram_posts",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeIdea {
    pub title: String,
    pub hook: String,
    pub bullet_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterThread {
    pub title: String,
    /// Older model output uses `body` for the tweet list.
    #[serde(alias = "body")]
    pub tweets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstagramReel {
    pub idea: String,
    /// One of: meme | cinematic | sarcastic | educational. Not enforced.
    pub caption_style: String,
}

/// Decoded content ideas for every platform.
///
/// Every collection defaults to empty, so a partially answered prompt still decodes.
/// Produced once per digest and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentIdeas {
    pub youtube_video_ideas: Vec<YouTubeIdea>,
    pub twitter_posts: Vec<String>,
    pub twitter_threads: Vec<TwitterThread>,
    pub linkedin_posts: Vec<String>,
    pub instagram_reels: Vec<InstagramReel>,
    pub instagram_posts: Vec<String>,
}

impl ContentIdeas {
    pub fn is_empty(&self) -> bool {
        self.youtube_video_ideas.is_empty()
            && self.twitter_posts.is_empty()
            && self.twitter_threads.is_empty()
            && self.linkedin_posts.is_empty()
            && self.instagram_reels.is_empty()
            && self.instagram_posts.is_empty()
    }
}
