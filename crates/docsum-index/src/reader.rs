//! Directory reader producing one document per file

use scraper::{Html, Selector};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use docsum_core::{Document, DocumentSource, Error, Result};

/// Reads every file in a directory into a [`Document`]
///
/// HTML files are reduced to their visible text; everything else is read as
/// UTF-8 (invalid sequences are replaced).
#[derive(Debug, Clone)]
pub struct SimpleDirectoryReader {
    input_dir: PathBuf,
    recursive: bool,
    exclude_hidden: bool,
    required_exts: Option<Vec<String>>,
}

impl SimpleDirectoryReader {
    /// Create a reader over the files directly inside `input_dir`
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            recursive: false,
            exclude_hidden: true,
            required_exts: None,
        }
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Only read files with one of these extensions (without the dot)
    pub fn required_exts<S: AsRef<str>>(mut self, exts: &[S]) -> Self {
        self.required_exts = Some(
            exts.iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        );
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with('.'))
                .unwrap_or(false)
    }

    fn wanted(&self, path: &Path) -> bool {
        match self.required_exts {
            Some(ref exts) => extension_of(path)
                .map(|ext| exts.iter().any(|e| *e == ext))
                .unwrap_or(false),
            None => true,
        }
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let exclude_hidden = self.exclude_hidden;

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.input_dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !(exclude_hidden && Self::is_hidden(entry)));

        for entry in walker {
            let entry = entry.map_err(|e| Error::DocumentSource(e.to_string()))?;
            if entry.file_type().is_file() && self.wanted(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn read_file(path: &Path) -> Result<Document> {
        let bytes = fs::read(path)?;
        let file_size = bytes.len();
        let extension = extension_of(path);

        let content = match extension.as_deref() {
            Some("html") | Some("htm") => html_to_text(&String::from_utf8_lossy(&bytes)),
            _ => String::from_utf8_lossy(&bytes).into_owned(),
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Document::new(
            content,
            json!({
                "file_path": path.to_string_lossy(),
                "file_name": file_name,
                "file_type": mime_for(extension.as_deref()),
                "file_size": file_size,
            }),
        ))
    }
}

impl DocumentSource for SimpleDirectoryReader {
    fn load_data(&self) -> Result<Vec<Document>> {
        if !self.input_dir.is_dir() {
            return Err(Error::DocumentSource(format!(
                "Directory {} does not exist.",
                self.input_dir.display()
            )));
        }

        let files = self.collect_files()?;
        if files.is_empty() {
            return Err(Error::DocumentSource(format!(
                "No files found in {}.",
                self.input_dir.display()
            )));
        }

        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            match Self::read_file(&path) {
                Ok(doc) => {
                    debug!(path = %path.display(), chars = doc.content.len(), "loaded document");
                    documents.push(doc);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable file"),
            }
        }

        Ok(documents)
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

fn mime_for(extension: Option<&str>) -> &'static str {
    match extension {
        Some("txt") => "text/plain",
        Some("md") | Some("markdown") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

/// Extract readable text from an HTML page
pub(crate) fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let blocks: Vec<String> = Selector::parse("h1, h2, h3, h4, h5, h6, p, li, pre, blockquote, td, th")
        .map(|selector| {
            document
                .select(&selector)
                .map(|element| collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")))
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if !blocks.is_empty() {
        return blocks.join("\n\n");
    }

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .map(|body| body.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    collapse_whitespace(&body)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn data_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b_essay.txt"), "What I Worked On").unwrap();
        fs::write(dir.path().join("a_notes.md"), "# Notes\nsecond file").unwrap();
        fs::write(dir.path().join(".hidden.txt"), "should not load").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.txt"), "deep file").unwrap();
        dir
    }

    #[test]
    fn test_reads_top_level_files_in_name_order() {
        let dir = data_dir();
        let docs = SimpleDirectoryReader::new(dir.path()).load_data().unwrap();

        let names: Vec<_> = docs.iter().filter_map(|d| d.metadata_str("file_name")).collect();
        assert_eq!(names, vec!["a_notes.md", "b_essay.txt"]);
        assert_eq!(docs[1].get_content(), "What I Worked On");
        assert_eq!(docs[0].metadata_str("file_type"), Some("text/markdown"));
    }

    #[test]
    fn test_recursive_reader_includes_nested_files() {
        let dir = data_dir();
        let docs = SimpleDirectoryReader::new(dir.path())
            .recursive(true)
            .load_data()
            .unwrap();

        assert_eq!(docs.len(), 3);
        assert!(docs.iter().any(|d| d.get_content() == "deep file"));
        assert!(!docs.iter().any(|d| d.get_content() == "should not load"));
    }

    #[test]
    fn test_required_exts_filter() {
        let dir = data_dir();
        let docs = SimpleDirectoryReader::new(dir.path())
            .required_exts(&[".txt"])
            .load_data()
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata_str("file_name"), Some("b_essay.txt"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = SimpleDirectoryReader::new(dir.path().join("nope")).load_data();
        assert!(matches!(result, Err(Error::DocumentSource(_))));
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = SimpleDirectoryReader::new(dir.path()).load_data().unwrap_err();
        assert!(err.to_string().contains("No files found"));
    }

    #[test]
    fn test_html_is_reduced_to_text() {
        let html = r#"
            <html>
                <head><title>ignored</title><script>var x = 1;</script></head>
                <body>
                    <h1>Test   Title</h1>
                    <p>This is a test paragraph.</p>
                </body>
            </html>
        "#;

        assert_eq!(html_to_text(html), "Test Title\n\nThis is a test paragraph.");
    }

    #[test]
    fn test_html_without_blocks_falls_back_to_body() {
        assert_eq!(html_to_text("<html><body><span>just  a span</span></body></html>"), "just a span");
    }
}
