//! The generation pipeline: describe the photo, then derive the article, alt text and theme
//! stylesheet from that description.

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info};

use crate::config::{
    Config, ALT_TEXT_SYSTEM_PROMPT, ALT_TEXT_USER_PROMPT, CSS_SYSTEM_PROMPT, CSS_USER_PROMPT,
    EXAMPLE_STYLESHEET, THEME_SYSTEM_PROMPT, THEME_USER_PROMPT, VISION_PROMPT,
};
use crate::llm::client::{build_message_content, chat_completion, system_and_user, truncate_for_log};
use crate::llm::styles::ArticleStyle;
use crate::storage::strip_code_fences;

#[derive(Debug, Clone)]
pub struct NewsifiedScene {
    pub description: String,
    pub article: String,
    pub alt_text: String,
    pub theme_css: String,
}

pub async fn describe_image(config: &Config, image: &[u8]) -> Result<String> {
    let messages = vec![json!({
        "role": "user",
        "content": build_message_content(VISION_PROMPT, &[image]),
    })];
    chat_completion(
        config,
        "describe_image",
        messages,
        Some(config.vision_max_tokens),
    )
    .await
}

pub async fn generate_article(
    config: &Config,
    description: &str,
    style: ArticleStyle,
) -> Result<String> {
    let user_content = format!(
        "{}\n\nScene Description: {}",
        style.user_prompt(),
        description
    );
    let operation = format!("article:{}", style.key());
    chat_completion(
        config,
        &operation,
        system_and_user(style.system_prompt(), &user_content),
        None,
    )
    .await
}

pub async fn generate_alt_text(config: &Config, description: &str) -> Result<String> {
    let user_content = ALT_TEXT_USER_PROMPT.replace("{description}", description);
    chat_completion(
        config,
        "alt_text",
        system_and_user(ALT_TEXT_SYSTEM_PROMPT, &user_content),
        None,
    )
    .await
}

/// Returns the model's JSON-ish blob with `primary_theme`, `color_theme` and `mood`, verbatim.
pub async fn generate_theme_keywords(config: &Config, description: &str) -> Result<String> {
    let user_content = THEME_USER_PROMPT.replace("{description}", description);
    chat_completion(
        config,
        "theme_keywords",
        system_and_user(THEME_SYSTEM_PROMPT, &user_content),
        None,
    )
    .await
}

pub async fn generate_theme_css(config: &Config, description: &str) -> Result<String> {
    let theme_keywords = generate_theme_keywords(config, description).await?;
    debug!("Theme keywords: {}", truncate_for_log(&theme_keywords, 500));

    let user_content = CSS_USER_PROMPT
        .replace("{example_stylesheet}", EXAMPLE_STYLESHEET)
        .replace("{theme_keywords}", &theme_keywords);
    let css = chat_completion(
        config,
        "theme_css",
        system_and_user(CSS_SYSTEM_PROMPT, &user_content),
        None,
    )
    .await?;
    Ok(strip_code_fences(&css))
}

/// Runs the full pipeline. Everything after the description is independent and runs concurrently;
/// the first failure aborts the rest.
pub async fn newsify(config: &Config, image: &[u8], style: ArticleStyle) -> Result<NewsifiedScene> {
    let description = describe_image(config, image).await?;
    info!(
        "Scene described ({} chars): {}",
        description.chars().count(),
        truncate_for_log(&description, 200)
    );

    let (article, alt_text, theme_css) = tokio::try_join!(
        generate_article(config, &description, style),
        generate_alt_text(config, &description),
        generate_theme_css(config, &description),
    )?;

    Ok(NewsifiedScene {
        description,
        article,
        alt_text,
        theme_css,
    })
}
