//! Plain-text sources: a directory tree of text files, or a single file.

use async_stream::stream;
use daon_work::Work;
use exn::ResultExt;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};
use tracing::{debug, instrument, warn};

use crate::error::{ErrorKind, Result};
use crate::options::TitleHeuristic;
use crate::{ImportOptions, Imported};

pub(crate) const PLATFORM: &str = "file";

enum WalkEntry {
    File(PathBuf),
    Descend(PathBuf),
    Skip,
}

async fn process_entry(entry: DirEntry) -> Result<WalkEntry> {
    let path = entry.path();
    let file_type = entry
        .file_type()
        .await
        .or_raise(|| ErrorKind::SourceRead(path.clone()))?;
    if file_type.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    if file_type.is_file() {
        return Ok(WalkEntry::File(path));
    }
    if file_type.is_symlink() {
        // Links to files are read; links to directories are not descended
        // into, so a link cycle cannot loop the walk.
        return Ok(match fs::metadata(&path).await {
            Ok(target) if target.is_file() => WalkEntry::File(path),
            Ok(_) => {
                debug!(path = %path.display(), "Not following directory link");
                WalkEntry::Skip
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Ignoring dangling link");
                WalkEntry::Skip
            },
        });
    }
    Ok(WalkEntry::Skip)
}

/// Every file below `root`, in no particular order. Unreadable directories
/// are yielded as errors and not descended into.
pub fn walk(root: &Path) -> impl Stream<Item = Result<PathBuf>> + '_ {
    let mut stack = vec![root.to_path_buf()];
    stream! {
        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(_) => {
                    yield Err(exn::Exn::from(ErrorKind::SourceRead(current)));
                    continue 'dirs;
                },
            };
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(_) => {
                        yield Err(exn::Exn::from(ErrorKind::SourceRead(current.clone())));
                        continue 'dirs;
                    },
                };
                match process_entry(entry).await {
                    Ok(WalkEntry::File(path)) => yield Ok(path),
                    Ok(WalkEntry::Descend(path)) => stack.push(path),
                    Ok(WalkEntry::Skip) => {},
                    Err(e) => yield Err(e),
                }
            }
        }
    }
}

#[instrument(skip(root, options), fields(root = %root.display()))]
pub async fn parse_directory(root: &Path, options: &ImportOptions) -> Result<Imported> {
    let metadata = fs::metadata(root)
        .await
        .or_raise(|| ErrorKind::SourceRead(root.to_path_buf()))?;
    if !metadata.is_dir() {
        exn::bail!(ErrorKind::SourceRead(root.to_path_buf()));
    }

    let mut imported = Imported::default();
    let mut paths = Vec::new();
    let mut files = std::pin::pin!(walk(root));
    while let Some(result) = files.next().await {
        match result {
            Ok(path) if has_allowed_extension(&path, options) => paths.push(path),
            Ok(path) => debug!(path = %path.display(), "Ignoring file with unlisted extension"),
            Err(e) => {
                warn!(error = ?e, "Skipping unreadable directory entry");
                imported.failed += 1;
            },
        }
    }
    paths.sort();

    for path in paths {
        match read_text(&path).await {
            Ok(text) => imported.accept(work_from_text(&path, &text, options.title_heuristic), &options.limits),
            Err(e) => {
                warn!(path = %path.display(), error = ?e, "Skipping unreadable file");
                imported.failed += 1;
            },
        }
    }
    Ok(imported)
}

/// A single text file as a one-work source.
#[instrument(skip(path, options), fields(path = %path.display()))]
pub async fn parse_text_file(path: &Path, options: &ImportOptions) -> Result<Imported> {
    let text = read_text(path).await.or_raise(|| ErrorKind::SourceRead(path.to_path_buf()))?;
    let mut imported = Imported::default();
    imported.accept(work_from_text(path, &text, options.title_heuristic), &options.limits);
    Ok(imported)
}

async fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).await.or_raise(|| ErrorKind::SourceRead(path.to_path_buf()))?;
    Ok(String::from_utf8(bytes).map_err(|_| ErrorKind::Decode(path.to_path_buf()))?)
}

fn has_allowed_extension(path: &Path, options: &ImportOptions) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| options.accepts_extension(ext))
}

/// Builds a work from the text of `path`. The first line becomes the title
/// when `heuristic` accepts it; otherwise the filename stem does.
pub fn work_from_text(path: &Path, text: &str, heuristic: TitleHeuristic) -> Work {
    let text = text.trim();
    let (title, content) = match heuristic.split(text) {
        Some((title, content)) => (title.to_string(), content),
        None => (file_stem(path), text),
    };
    let path_string = path.display().to_string();
    Work::builder(title, content)
        .original_id(Some(path_string))
        .platform(PLATFORM)
        .source_file(path)
        .build()
}

fn file_stem(path: &Path) -> String {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use daon_work::Limits;
    use rstest::rstest;
    use tempfile::TempDir;

    const BODY: &str = "The rain had not stopped for three days, and the river was rising faster than anyone had predicted.";

    fn options() -> ImportOptions {
        ImportOptions {
            limits: Limits::STANDARD.with_min_content_chars(20),
            ..ImportOptions::default()
        }
    }

    #[test]
    fn test_short_first_line_is_title() {
        let text = format!("My Story\n\n{BODY}");
        let work = work_from_text(Path::new("/stories/draft.txt"), &text, TitleHeuristic::default());
        assert_eq!(work.title(), "My Story");
        assert_eq!(work.content(), BODY);
        assert!(!work.content().contains("My Story"));
        assert_eq!(work.platform(), "file");
        assert_eq!(work.original_id(), Some("/stories/draft.txt"));
        assert_eq!(work.source_file(), Some(Path::new("/stories/draft.txt")));
    }

    #[rstest]
    #[case(TitleHeuristic::LengthAndPunctuation, "rain")]
    #[case(TitleHeuristic::Length, "The rain fell.")]
    fn test_sentence_first_line(#[case] heuristic: TitleHeuristic, #[case] expected_title: &str) {
        let text = format!("The rain fell.\n{BODY}");
        let work = work_from_text(Path::new("rain.md"), &text, heuristic);
        assert_eq!(work.title(), expected_title);
    }

    #[test]
    fn test_long_first_line_keeps_whole_text() {
        let work = work_from_text(Path::new("long.txt"), BODY, TitleHeuristic::Length);
        assert_eq!(work.title(), "long");
        assert_eq!(work.content(), BODY);
    }

    #[test]
    fn test_leading_blank_lines_are_trimmed() {
        let text = format!("\n\n  Title Here  \n{BODY}\n\n");
        let work = work_from_text(Path::new("x.txt"), &text, TitleHeuristic::default());
        assert_eq!(work.title(), "Title Here");
        assert_eq!(work.content(), BODY);
    }

    #[tokio::test]
    async fn test_parse_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        std::fs::write(dir.path().join("b.txt"), format!("Second\n\n{BODY}")).unwrap();
        std::fs::write(dir.path().join("a.MD"), format!("First\n\n{BODY}")).unwrap();
        std::fs::write(dir.path().join("nested/deeper/c.rst"), format!("Third\n\n{BODY}")).unwrap();
        std::fs::write(dir.path().join("nested/notes.text"), "Tiny\n\ntoo short").unwrap();
        std::fs::write(dir.path().join("image.png"), [0x89, 0x50, 0x4e, 0x47]).unwrap();
        std::fs::write(dir.path().join("broken.txt"), [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let imported = parse_directory(dir.path(), &options()).await.unwrap();
        let titles: Vec<_> = imported.works.iter().map(Work::title).collect();
        assert_eq!(titles, ["First", "Second", "Third"]);
        assert_eq!(imported.rejected, 1);
        assert_eq!(imported.failed, 1);
    }

    #[tokio::test]
    async fn test_parse_directory_requires_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("story.txt");
        std::fs::write(&file, BODY).unwrap();
        let err = parse_directory(&file, &options()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::SourceRead(_)));
        let err = parse_directory(&dir.path().join("missing"), &options()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::SourceRead(_)));
    }

    #[tokio::test]
    async fn test_parse_text_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("story.md");
        std::fs::write(&file, format!("My Story\n\n{BODY}")).unwrap();
        let imported = parse_text_file(&file, &options()).await.unwrap();
        assert_eq!(imported.works.len(), 1);
        assert_eq!(imported.works[0].title(), "My Story");
    }

    #[tokio::test]
    async fn test_walk_lists_every_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("one.txt"), "1").unwrap();
        std::fs::write(dir.path().join("sub/two.bin"), "2").unwrap();
        let mut found: Vec<PathBuf> = walk(dir.path()).filter_map(|r| async move { r.ok() }).collect().await;
        found.sort();
        assert_eq!(found, [dir.path().join("one.txt"), dir.path().join("sub/two.bin")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_walk_follows_file_links_only() {
        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("story.txt"), "linked").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("story.txt"), dir.path().join("linked.txt")).unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("sub/loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("dangling.txt")).unwrap();

        let found: Vec<PathBuf> = walk(dir.path()).filter_map(|r| async move { r.ok() }).collect().await;
        assert_eq!(found, [dir.path().join("linked.txt")]);
    }
}
