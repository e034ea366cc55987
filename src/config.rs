use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub bind_address: String,
    pub public_base_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub vision_max_tokens: u32,
    pub llm_timeout_seconds: u64,
    pub upload_dir: PathBuf,
    pub stylesheet_path: PathBuf,
    pub max_upload_bytes: usize,
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

fn normalize_base_url(value: &str, default: &str) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return default.to_string();
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        warn!(
            "Base URL '{}' has no scheme; falling back to {}.",
            value, default
        );
        return default.to_string();
    }
    trimmed.to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        if openai_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("OPENAI_API_KEY is required"));
        }

        Ok(Config {
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            bind_address: env_string("BIND_ADDRESS", "127.0.0.1:5000"),
            public_base_url: normalize_base_url(
                &env_string("PUBLIC_BASE_URL", ""),
                "http://127.0.0.1:5000",
            ),
            openai_api_key,
            openai_base_url: normalize_base_url(
                &env_string("OPENAI_BASE_URL", ""),
                "https://api.openai.com/v1",
            ),
            openai_model: env_string("OPENAI_MODEL", "gpt-4o"),
            vision_max_tokens: env_u32("VISION_MAX_TOKENS", 300),
            llm_timeout_seconds: env_u64("LLM_TIMEOUT_SECONDS", 60),
            upload_dir: PathBuf::from(env_string("UPLOAD_DIR", "uploads")),
            stylesheet_path: PathBuf::from(env_string("STYLESHEET_PATH", "static/newsified.css")),
            max_upload_bytes: env_usize("MAX_UPLOAD_BYTES", 20 * 1024 * 1024),
        })
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_seconds.max(1))
    }
}

pub const VISION_PROMPT: &str = "What's in this image?";

pub const ALT_TEXT_SYSTEM_PROMPT: &str = "You are an accessibility expert focused on creating clear, concise alt text for screen readers. Focus on:\n- Essential visual information\n- Clear, concrete descriptions\n- Logical structure (general to specific)\n- Avoid redundant or decorative details\nMaximum length: 100 words";

pub const ALT_TEXT_USER_PROMPT: &str =
    "Create concise, descriptive alt text for a screen reader based on this scene description: {description}";

pub const THEME_SYSTEM_PROMPT: &str = "You are a visual theme analyzer. Extract key themes as single words that could inform design choices. Focus on:\n- Emotional tone\n- Color palette suggestions\n- Visual mood\nOutput format: JSON with keys for 'primary_theme', 'color_theme', 'mood'";

pub const THEME_USER_PROMPT: &str =
    "Analyze this scene and provide theme keywords that could inform a visual design: {description}";

pub const CSS_SYSTEM_PROMPT: &str = "You are a CSS designer. Create a cohesive theme based on provided keywords. Focus on:\n- Color schemes\n- Typography choices\n- Spacing and layout\n- Mood-appropriate styling\nOutput format: Valid CSS with variables and basic layout classes";

pub const CSS_USER_PROMPT: &str = r#"Create a CSS theme based on these theme keywords: {theme_keywords}
The theme should include:
- CSS variables for colors
- Basic typography settings
- Container classes
- Card/content styling
- Appropriate spacing variables

Here is an example, separated by hashtags (#) of the current css so that you know what classes are used:

#
{example_stylesheet}
#

Please export the new theme using these classes and ids, otherwise it will not work.
Also, do not start the response with ```css or end with ``` as this breaks the css."#;

pub const EXAMPLE_STYLESHEET: &str = r#":root {
  --color-primary: #646cff;
  --color-primary-hover: #535bf2;
  --color-text-light: #f8fafc;
  --color-text-dark: #1e293b;
  --color-background-dark: #0f172a;
  --color-background-light: #ffffff;
  --color-surface-dark: #1e293b;
  --color-surface-light: #f1f5f9;
  --color-border: rgba(255, 255, 255, 0.1);

  --font-family-base: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
  --font-family-heading: 'Inter', sans-serif;
  --font-size-base: clamp(1rem, 1vw + 0.75rem, 1.125rem);
  --line-height-base: 1.6;

  --spacing-xs: clamp(0.5rem, 1vw, 0.75rem);
  --spacing-sm: clamp(0.75rem, 1.5vw, 1rem);
  --spacing-md: clamp(1rem, 2vw, 1.5rem);
  --spacing-lg: clamp(1.5rem, 3vw, 2rem);
  --spacing-xl: clamp(2rem, 4vw, 3rem);

  --radius-sm: 0.375rem;
  --radius-md: 0.5rem;
  --radius-lg: 0.75rem;
}

/* Base styles */
body {
  font-family: var(--font-family-base);
  font-size: var(--font-size-base);
  line-height: var(--line-height-base);
  background-color: var(--color-background-dark);
  color: var(--color-text-light);
  -webkit-font-smoothing: antialiased;
  -moz-osx-font-smoothing: grayscale;
  min-height: 100vh;
}

.container {
  width: 100%;
  max-width: 800px;
  margin: 0 auto;
  padding: var(--spacing-lg);
}

.content {
  background-color: var(--color-surface-dark);
  border-radius: var(--radius-lg);
  padding: var(--spacing-lg);
  box-shadow: 0 4px 6px -1px rgba(0, 0, 0, 0.1),
              0 2px 4px -1px rgba(0, 0, 0, 0.06);
}

h1 {
  font-family: var(--font-family-heading);
  font-size: clamp(2rem, 4vw + 1rem, 3rem);
  font-weight: 700;
  margin-bottom: var(--spacing-lg);
  line-height: 1.2;
  text-align: center;
}

#image-container {
  margin-bottom: var(--spacing-lg);
  border-radius: var(--radius-md);
  overflow: hidden;
}

#newsified-image {
  width: 100%;
  height: auto;
  display: block;
  border-radius: var(--radius-md);
}

#article-container {
  background-color: var(--color-surface-dark);
  padding: var(--spacing-md);
  border-radius: var(--radius-md);
  border: 1px solid var(--color-border);
}

#newsified-article {
  margin: 0;
  font-size: var(--font-size-base);
  line-height: var(--line-height-base);
}

/* Light mode support */
@media (prefers-color-scheme: light) {
  body {
    background-color: var(--color-background-light);
    color: var(--color-text-dark);
  }

  .content {
    background-color: var(--color-surface-light);
  }

  #article-container {
    background-color: var(--color-surface-light);
    border-color: rgba(0, 0, 0, 0.1);
  }
}

/* Responsive adjustments */
@media (max-width: 768px) {
  .container {
    padding: var(--spacing-md);
  }

  .content {
    padding: var(--spacing-md);
  }

  h1 {
    font-size: clamp(1.5rem, 3vw + 1rem, 2rem);
    margin-bottom: var(--spacing-md);
  }
}

.go-back-button {
  display: block;
  width: 100%;
  max-width: 200px;
  margin: var(--spacing-md) auto;
  padding: var(--spacing-sm);
  font-size: var(--font-size-base);
  color: var(--color-text-light);
  background-color: var(--color-primary);
  border: none;
  border-radius: var(--radius-md);
  cursor: pointer;
  text-align: center;
  transition: background-color 0.3s ease;
}

.go-back-button:hover {
  background-color: var(--color-primary-hover);
}

/* Reduced motion preferences */
@media (prefers-reduced-motion: reduce) {
  * {
    animation-duration: 0.01ms !important;
    animation-iteration-count: 1 !important;
    transition-duration: 0.01ms !important;
    scroll-behavior: auto !important;
  }
}"#;

#[cfg(test)]
pub fn test_config(
    base_url: &str,
    upload_dir: impl Into<PathBuf>,
    stylesheet_path: impl Into<PathBuf>,
) -> Config {
    Config {
        log_level: "debug".to_string(),
        bind_address: "127.0.0.1:0".to_string(),
        public_base_url: "http://127.0.0.1:5000".to_string(),
        openai_api_key: "test-key".to_string(),
        openai_base_url: base_url.trim_end_matches('/').to_string(),
        openai_model: "gpt-4o".to_string(),
        vision_max_tokens: 300,
        llm_timeout_seconds: 5,
        upload_dir: upload_dir.into(),
        stylesheet_path: stylesheet_path.into(),
        max_upload_bytes: 1024 * 1024,
    }
}
