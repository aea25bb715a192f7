use crate::config::Config;
use crate::cover_art::{self, CoverArt};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const STANDALONE: &str = "Standalone";

/// One search hit from the lookup service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorField>,
    #[serde(default)]
    pub series: Option<SeriesField>,
    #[serde(rename = "coverUrl", default)]
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AuthorField {
    Name(String),
    List(Vec<Named>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SeriesField {
    Name(String),
    Entry(Named),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Named {
    pub name: String,
}

impl Candidate {
    /// Author names joined with ", ".
    pub fn author_text(&self) -> Option<String> {
        let text = match self.author.as_ref()? {
            AuthorField::Name(name) => name.trim().to_string(),
            AuthorField::List(list) => list
                .iter()
                .map(|a| a.name.trim())
                .filter(|n| !n.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };
        non_blank(&text)
    }

    pub fn series_text(&self) -> Option<String> {
        match self.series.as_ref()? {
            SeriesField::Name(name) => non_blank(name),
            SeriesField::Entry(entry) => non_blank(&entry.name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    items: Vec<Candidate>,
}

/// Title/author hint read from the main audio file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagHint {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Final values written to tags and used for the library path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub title: String,
    pub author: String,
    pub series: String,
    pub cover_url: Option<String>,
}

impl From<&Candidate> for ResolvedMetadata {
    fn from(candidate: &Candidate) -> Self {
        Self {
            title: candidate
                .title
                .as_deref()
                .and_then(non_blank)
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            author: candidate.author_text().unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            series: candidate.series_text().unwrap_or_else(|| STANDALONE.to_string()),
            cover_url: candidate.cover_url.as_deref().and_then(non_blank),
        }
    }
}

/// Remote metadata service.
pub trait BookLookup {
    async fn search(&self, title: &str) -> Result<Vec<Candidate>>;
    async fn fetch_cover(&self, url: &str) -> Result<Option<CoverArt>>;
}

/// Client for the Audnexus lookup endpoint.
pub struct AudnexusClient {
    client: reqwest::Client,
    base_url: String,
}

impl AudnexusClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.lookup_url.clone(),
        })
    }

    fn search_url(&self, title: &str) -> String {
        format!("{}?term={}&type=all", self.base_url, urlencoding::encode(title))
    }
}

impl BookLookup for AudnexusClient {
    async fn search(&self, title: &str) -> Result<Vec<Candidate>> {
        let url = self.search_url(title);
        info!("🔎 Looking up '{}'", title);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await
            .with_context(|| format!("Request to {} failed", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Lookup returned {}", status);
        }

        let body = response.text().await?;
        parse_lookup_body(&body)
    }

    async fn fetch_cover(&self, url: &str) -> Result<Option<CoverArt>> {
        cover_art::download_cover(&self.client, url).await
    }
}

fn parse_lookup_body(body: &str) -> Result<Vec<Candidate>> {
    let parsed: LookupResponse = serde_json::from_str(body)
        .context("Lookup response is not valid JSON")?;
    Ok(parsed.items)
}

/// Picks the first candidate whose author contains the hint (case-insensitive),
/// falling back to the first candidate.
pub fn select_candidate<'a>(candidates: &'a [Candidate], author_hint: Option<&str>) -> Option<&'a Candidate> {
    let hint = author_hint
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty());

    if let Some(hint) = hint {
        let matched = candidates.iter().find(|c| {
            c.author_text()
                .map(|author| author.to_lowercase().contains(&hint))
                .unwrap_or(false)
        });

        if matched.is_some() {
            return matched;
        }
        debug!("No candidate author contains '{}', using first result", hint);
    }

    candidates.first()
}

pub(crate) fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
pub(crate) fn candidate(title: &str, author: &str) -> Candidate {
    Candidate {
        title: Some(title.to_string()),
        author: Some(AuthorField::Name(author.to_string())),
        ..Candidate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_prefers_author_match() {
        let candidates = vec![
            candidate("My Book", "Somebody Else"),
            candidate("My Book", "Jane Doe"),
        ];

        let chosen = select_candidate(&candidates, Some("jane doe")).unwrap();
        assert_eq!(chosen.author_text().as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_select_matches_substring() {
        let candidates = vec![
            candidate("My Book", "Other"),
            candidate("My Book", "Jane Doe, John Roe"),
        ];

        let chosen = select_candidate(&candidates, Some("DOE")).unwrap();
        assert_eq!(chosen.author_text().as_deref(), Some("Jane Doe, John Roe"));
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let candidates = vec![candidate("First", "A. Writer"), candidate("Second", "B. Writer")];

        let chosen = select_candidate(&candidates, Some("Jane Doe")).unwrap();
        assert_eq!(chosen.title.as_deref(), Some("First"));

        let chosen = select_candidate(&candidates, None).unwrap();
        assert_eq!(chosen.title.as_deref(), Some("First"));

        let chosen = select_candidate(&candidates, Some("   ")).unwrap();
        assert_eq!(chosen.title.as_deref(), Some("First"));
    }

    #[test]
    fn test_select_empty() {
        assert!(select_candidate(&[], Some("Jane Doe")).is_none());
    }

    #[test]
    fn test_parse_lookup_body_shapes() {
        let body = r#"{
            "items": [
                {"title": "Dune", "author": "Frank Herbert", "series": "Dune Chronicles", "coverUrl": "https://img/1.jpg"},
                {"title": "Dune Messiah", "author": [{"name": "Frank Herbert"}, {"name": "Brian Herbert"}],
                 "series": {"name": "Dune Chronicles", "position": "2"}, "asin": "B00"},
                {"author": "  "}
            ]
        }"#;

        let items = parse_lookup_body(body).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].cover_url.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(items[1].author_text().as_deref(), Some("Frank Herbert, Brian Herbert"));
        assert_eq!(items[1].series_text().as_deref(), Some("Dune Chronicles"));
        assert_eq!(items[2].author_text(), None);
    }

    #[test]
    fn test_parse_lookup_body_without_items() {
        assert!(parse_lookup_body("{}").unwrap().is_empty());
        assert!(parse_lookup_body("<html>").is_err());
    }

    #[test]
    fn test_resolved_defaults() {
        let resolved = ResolvedMetadata::from(&Candidate::default());
        assert_eq!(resolved.title, UNKNOWN_TITLE);
        assert_eq!(resolved.author, UNKNOWN_AUTHOR);
        assert_eq!(resolved.series, STANDALONE);
        assert_eq!(resolved.cover_url, None);

        let resolved = ResolvedMetadata::from(&Candidate {
            title: Some(" The Hobbit ".to_string()),
            author: Some(AuthorField::Name("J.R.R. Tolkien".to_string())),
            series: Some(SeriesField::Name("".to_string())),
            cover_url: Some("".to_string()),
        });
        assert_eq!(resolved.title, "The Hobbit");
        assert_eq!(resolved.series, STANDALONE);
        assert_eq!(resolved.cover_url, None);
    }

    #[test]
    fn test_search_url_encodes_title() {
        let client = AudnexusClient::new(&Config::default()).unwrap();
        assert_eq!(
            client.search_url("My Book & More"),
            "https://api.audnex.us/lookup?term=My%20Book%20%26%20More&type=all"
        );
    }
}
