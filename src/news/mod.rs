pub mod service;

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, MissingField, Result, SubmitError};
use crate::storage::Blob;

pub use service::NewsService;

/// Collection holding news documents.
pub const NEWS_COLLECTION: &str = "news";

/// Largest accepted cover image (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
];

/// A news article as persisted in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub location: String,
    pub title: String,
    #[serde(rename = "image")]
    pub image_url: String,
    #[serde(rename = "imagePath", default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Markdown body
    pub content: String,
    #[serde(rename = "userid")]
    pub author_id: String,
    #[serde(rename = "username")]
    pub author_name: String,
    #[serde(rename = "date")]
    pub created_date: NaiveDate,
}

/// A news item with the id of the document it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNews {
    pub id: String,
    pub item: NewsItem,
}

/// Already authenticated writer of a news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
}

impl Author {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Whether a submission creates a new document or rewrites an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(String),
}

/// Everything the authoring form collects before submit.
#[derive(Debug, Clone)]
pub struct NewsSubmission {
    pub location: String,
    pub title: String,
    pub content: String,
    pub image: Option<Blob>,
    pub author: Author,
    pub target: SubmitTarget,
}

impl NewsSubmission {
    pub fn new<L, T, C>(location: L, title: T, content: C, image: Option<Blob>, author: Author) -> Self
    where
        L: Into<String>,
        T: Into<String>,
        C: Into<String>,
    {
        Self {
            location: location.into(),
            title: title.into(),
            content: content.into(),
            image,
            author,
            target: SubmitTarget::Create,
        }
    }

    /// Rewrite the document `id` instead of creating a new one.
    pub fn updating<I: Into<String>>(mut self, id: I) -> Self {
        self.target = SubmitTarget::Update(id.into());
        self
    }

    /// Check required fields and hand back the image to upload.
    pub fn validate(&self) -> std::result::Result<&Blob, SubmitError> {
        if self.location.trim().is_empty() {
            return Err(SubmitError::Validation(MissingField::Location));
        }
        if self.title.trim().is_empty() {
            return Err(SubmitError::Validation(MissingField::Title));
        }
        if self.content.trim().is_empty() {
            return Err(SubmitError::Validation(MissingField::Content));
        }
        match &self.image {
            Some(image) if !image.is_empty() => Ok(image),
            _ => Err(SubmitError::Validation(MissingField::Image)),
        }
    }
}

/// Object-store path of an image: `{location}/{file_name}`.
pub fn image_path(location: &str, file_name: &str) -> String {
    format!("{}/{}", location, file_name)
}

/// Content type for a supported image file name, by extension.
pub fn image_content_type(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
}

/// Read a cover image from disk, enforcing type and size limits.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Blob> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Invalid(format!("No file name in {}", path.display())))?;

    let content_type = image_content_type(file_name).ok_or_else(|| {
        Error::Invalid(format!("{} is not a jpg, png or gif image", file_name))
    })?;

    let bytes = std::fs::read(path)?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(Error::Invalid(format!(
            "{} is {} bytes, the limit is {}",
            file_name,
            bytes.len(),
            MAX_IMAGE_BYTES
        )));
    }

    Ok(Blob::new(file_name, bytes).with_content_type(content_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn submission() -> NewsSubmission {
        NewsSubmission::new(
            "rome",
            "Title",
            "Body",
            Some(Blob::new("cover.png", vec![1, 2, 3])),
            Author::new("u1", "Ada"),
        )
    }

    #[test]
    fn test_validate_accepts_complete_submission() {
        let sub = submission();
        let image = sub.validate().unwrap();
        assert_eq!(image.file_name, "cover.png");
    }

    #[test]
    fn test_validate_reports_missing_field() {
        let mut sub = submission();
        sub.title = "   ".to_string();
        assert!(matches!(
            sub.validate(),
            Err(SubmitError::Validation(MissingField::Title))
        ));

        let mut sub = submission();
        sub.content = String::new();
        assert!(matches!(
            sub.validate(),
            Err(SubmitError::Validation(MissingField::Content))
        ));

        let mut sub = submission();
        sub.image = None;
        assert!(matches!(
            sub.validate(),
            Err(SubmitError::Validation(MissingField::Image))
        ));

        let mut sub = submission();
        sub.image = Some(Blob::new("empty.png", Vec::new()));
        assert!(matches!(
            sub.validate(),
            Err(SubmitError::Validation(MissingField::Image))
        ));

        let mut sub = submission();
        sub.location = String::new();
        assert!(matches!(
            sub.validate(),
            Err(SubmitError::Validation(MissingField::Location))
        ));
    }

    #[test]
    fn test_news_item_field_names() {
        let item = NewsItem {
            location: "rome".to_string(),
            title: "Title".to_string(),
            image_url: "https://cdn/rome/a.png".to_string(),
            image_path: Some("rome/a.png".to_string()),
            content: "*Body*".to_string(),
            author_id: "u1".to_string(),
            author_name: "Ada".to_string(),
            created_date: NaiveDate::from_ymd_opt(2020, 4, 5).unwrap(),
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({
                "location": "rome",
                "title": "Title",
                "image": "https://cdn/rome/a.png",
                "imagePath": "rome/a.png",
                "content": "*Body*",
                "userid": "u1",
                "username": "Ada",
                "date": "2020-04-05"
            })
        );
    }

    #[test]
    fn test_news_item_without_image_path_decodes() {
        let item: NewsItem = serde_json::from_value(json!({
            "location": "rome",
            "title": "Old",
            "image": "https://cdn/old.png",
            "content": "x",
            "userid": "u1",
            "username": "Ada",
            "date": "2020-03-01"
        }))
        .unwrap();
        assert!(item.image_path.is_none());
    }

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type("a.PNG"), Some("image/png"));
        assert_eq!(image_content_type("photo.jpeg"), Some("image/jpeg"));
        assert_eq!(image_content_type("doc.pdf"), None);
        assert_eq!(image_content_type("noext"), None);
    }

    #[test]
    fn test_load_image() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("cover.gif");
        std::fs::write(&good, b"GIF89a").unwrap();

        let blob = load_image(&good).unwrap();
        assert_eq!(blob.file_name, "cover.gif");
        assert_eq!(blob.content_type.as_deref(), Some("image/gif"));
        assert_eq!(blob.bytes, b"GIF89a");

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"hello").unwrap();
        assert!(matches!(load_image(&text), Err(Error::Invalid(_))));

        let large = dir.path().join("large.png");
        std::fs::write(&large, vec![0u8; MAX_IMAGE_BYTES + 1]).unwrap();
        assert!(matches!(load_image(&large), Err(Error::Invalid(_))));

        assert!(matches!(load_image(dir.path().join("gone.png")), Err(Error::Io(_))));
    }

    #[test]
    fn test_image_path() {
        assert_eq!(image_path("rome", "cover.png"), "rome/cover.png");
        assert_eq!(
            submission().updating("doc1").target,
            SubmitTarget::Update("doc1".to_string())
        );
    }
}
