use std::path::Path;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "heif"];

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z]*[ \t]*\r?\n?").expect("valid leading fence regex"));
static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n?```[ \t]*$").expect("valid trailing fence regex"));

/// Lower-cased extension of `filename` when it is one of [`ALLOWED_EXTENSIONS`].
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    ALLOWED_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

pub fn unique_filename(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

pub async fn save_upload(dir: &Path, filename: &str, bytes: &[u8]) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|err| anyhow!("Failed to create upload directory '{}': {}", dir.display(), err))?;
    let path = dir.join(filename);
    fs::write(&path, bytes)
        .await
        .map_err(|err| anyhow!("Failed to save upload '{}': {}", path.display(), err))?;
    debug!("Saved upload {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Replaces the shared stylesheet through a sibling temp file so readers never see a partial write.
pub async fn write_stylesheet(path: &Path, css: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|err| {
            anyhow!(
                "Failed to create stylesheet directory '{}': {}",
                parent.display(),
                err
            )
        })?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Stylesheet path '{}' has no file name", path.display()))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, css)
        .await
        .map_err(|err| anyhow!("Failed to write stylesheet '{}': {}", temp_path.display(), err))?;
    if let Err(err) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(anyhow!(
            "Failed to replace stylesheet '{}': {}",
            path.display(),
            err
        ));
    }
    debug!("Wrote stylesheet {} ({} bytes)", path.display(), css.len());
    Ok(())
}

pub fn strip_code_fences(css: &str) -> String {
    let trimmed = css.trim();
    let without_leading = LEADING_FENCE.replace(trimmed, "");
    TRAILING_FENCE
        .replace(&without_leading, "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_extensions_in_any_case() {
        assert_eq!(allowed_extension("photo.PNG").as_deref(), Some("png"));
        assert_eq!(allowed_extension("a.b.jpeg").as_deref(), Some("jpeg"));
        assert_eq!(allowed_extension("shot.HeIf").as_deref(), Some("heif"));
    }

    #[test]
    fn rejects_missing_or_disallowed_extensions() {
        assert_eq!(allowed_extension("photo"), None);
        assert_eq!(allowed_extension(""), None);
        assert_eq!(allowed_extension("notes.txt"), None);
        assert_eq!(allowed_extension("image.gif"), None);
        assert_eq!(allowed_extension("trailingdot."), None);
    }

    #[test]
    fn unique_filenames_keep_extension_and_differ() {
        let first = unique_filename("png");
        let second = unique_filename("png");
        assert!(first.ends_with(".png"));
        assert_ne!(first, second);
        assert!(Uuid::parse_str(first.trim_end_matches(".png")).is_ok());
    }

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(
            strip_code_fences("```css\nbody { color: red; }\n```"),
            "body { color: red; }"
        );
        assert_eq!(strip_code_fences("```\n:root {}\n```\n"), ":root {}");
        assert_eq!(strip_code_fences("h1 { margin: 0; }"), "h1 { margin: 0; }");
    }

    #[tokio::test]
    async fn saves_upload_into_new_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let uploads = dir.path().join("nested").join("uploads");
        save_upload(&uploads, "a.png", b"bytes").await.expect("save");
        assert_eq!(std::fs::read(uploads.join("a.png")).expect("read"), b"bytes");
    }

    #[tokio::test]
    async fn stylesheet_is_overwritten_without_leftovers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("src").join("newsified.css");

        write_stylesheet(&path, "body { color: red; }").await.expect("first write");
        write_stylesheet(&path, "body { color: blue; }").await.expect("second write");

        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "body { color: blue; }"
        );
        let entries = std::fs::read_dir(dir.path().join("src")).expect("read dir").count();
        assert_eq!(entries, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_locked_writes_leave_one_whole_stylesheet() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("src").join("newsified.css");
        let state = crate::state::AppState::new(crate::config::test_config(
            "http://localhost",
            dir.path().join("uploads"),
            &path,
        ));
        let red = format!("body {{ color: red; }}\n{}", "/* red */\n".repeat(4096));
        let blue = format!("body {{ color: blue; }}\n{}", "/* blue */\n".repeat(4096));

        let writers: Vec<_> = [red.clone(), blue.clone()]
            .into_iter()
            .map(|css| {
                let state = state.clone();
                let path = path.clone();
                tokio::spawn(async move {
                    let _guard = state.stylesheet_lock.lock().await;
                    write_stylesheet(&path, &css).await
                })
            })
            .collect();
        for writer in writers {
            writer.await.expect("join").expect("write");
        }

        let written = std::fs::read_to_string(&path).expect("read");
        assert!(written == red || written == blue);
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("src"))
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("newsified.css")]);
    }
}
