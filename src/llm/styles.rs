use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};

/// Editorial voice used when turning a scene description into an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleStyle {
    #[default]
    Formal,
    Tabloid,
    Blog,
    Social,
}

const FORMAL_SYSTEM_PROMPT: &str = "You are a professional newspaper journalist. Focus on:\n- Objective reporting\n- Proper attribution\n- Inverted pyramid structure\n- Professional tone\n- Replace all persons' names with John Doe, Jane Doe and replace all organisation/place data with nouns.\nFormat: Traditional news article with headline and structured paragraphs.";

const FORMAL_USER_PROMPT: &str = "Write a formal news article about this scene. Include:\n1. Clear headline\n2. Main subject identification\n3. Comprehensive scene description\nReplace all persons' names with John Doe, Jane Doe and replace all organisation/place data with nouns.\n4. Relevant context";

const TABLOID_SYSTEM_PROMPT: &str = "You are a tabloid journalist. Focus on:\n- Dramatic headlines\n- Emotional angles\n- Visual descriptions\n- Human interest\nReplace all persons' names with John Doe, Jane Doe and replace all organisation/place data with nouns.\nFormat: Bold headline, punchy text, attention-grabbing style.";

const TABLOID_USER_PROMPT: &str = "Write a tabloid-style article about this scene. Include:\n1. Eye-catching headline\n2. Dramatic description\n3. Emotional elements\n4. Engaging quotes";

const BLOG_SYSTEM_PROMPT: &str = "You are an analytical blogger. Focus on:\n- Personal perspective\n- Detailed analysis\n- Reader engagement\n- Expert insights\nReplace all persons' names with John Doe, Jane Doe and replace all organisation/place data with nouns.\nFormat: Blog post with sections and personal insights.";

const BLOG_USER_PROMPT: &str = "Write a blog post about this scene. Include:\n1. Engaging title\n2. Scene analysis\n3. Expert commentary\n4. Reader engagement elements";

const SOCIAL_SYSTEM_PROMPT: &str = "You are a social media content creator. Create:\n- Twitter thread (5-7 tweets)\n- Instagram caption\n- LinkedIn post\nReplace all persons' names with John Doe, Jane Doe and replace all organisation/place data with nouns.";

const SOCIAL_USER_PROMPT: &str = "Create social media content about this scene. Include:\n1. Twitter thread\n2. Instagram caption with hashtags\n3. Professional LinkedIn post";

impl ArticleStyle {
    pub const ALL: [ArticleStyle; 4] = [
        ArticleStyle::Formal,
        ArticleStyle::Tabloid,
        ArticleStyle::Blog,
        ArticleStyle::Social,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ArticleStyle::Formal => "formal",
            ArticleStyle::Tabloid => "tabloid",
            ArticleStyle::Blog => "blog",
            ArticleStyle::Social => "social",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            ArticleStyle::Formal => FORMAL_SYSTEM_PROMPT,
            ArticleStyle::Tabloid => TABLOID_SYSTEM_PROMPT,
            ArticleStyle::Blog => BLOG_SYSTEM_PROMPT,
            ArticleStyle::Social => SOCIAL_SYSTEM_PROMPT,
        }
    }

    pub fn user_prompt(self) -> &'static str {
        match self {
            ArticleStyle::Formal => FORMAL_USER_PROMPT,
            ArticleStyle::Tabloid => TABLOID_USER_PROMPT,
            ArticleStyle::Blog => BLOG_USER_PROMPT,
            ArticleStyle::Social => SOCIAL_USER_PROMPT,
        }
    }
}

impl FromStr for ArticleStyle {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_lowercase();
        ArticleStyle::ALL
            .into_iter()
            .find(|style| style.key() == lowered)
            .ok_or_else(|| anyhow!("Unknown article style '{}'", value))
    }
}

impl fmt::Display for ArticleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
