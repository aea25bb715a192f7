use crate::cover_art::CoverArt;
use crate::metadata::{non_blank, ResolvedMetadata, TagHint};
use anyhow::{Context, Result};
use lofty::picture::PictureType;
use lofty::tag::ItemKey;
use mp4ameta::Fourcc;
use std::path::Path;

/// Semantic fields this tool reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    Series,
    Cover,
}

const TEXT_FIELDS: [Field; 3] = [Field::Title, Field::Author, Field::Series];

/// Container families, one adapter each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFormat {
    /// iTunes atoms in m4b/m4a
    Mp4,
    /// mp3
    Id3v2,
    /// flac, ogg, opus
    VorbisComments,
}

/// Where a field lives inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKey {
    Atom(Fourcc),
    Item(ItemKey),
    Picture(PictureType),
}

impl TagFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "m4b" | "m4a" => Some(TagFormat::Mp4),
            "mp3" => Some(TagFormat::Id3v2),
            "flac" | "ogg" | "opus" => Some(TagFormat::VorbisComments),
            _ => None,
        }
    }

    pub fn key(self, field: Field) -> TagKey {
        match (self, field) {
            (TagFormat::Mp4, Field::Title) => TagKey::Atom(Fourcc(*b"\xa9nam")),
            (TagFormat::Mp4, Field::Author) => TagKey::Atom(Fourcc(*b"\xa9ART")),
            (TagFormat::Mp4, Field::Series) => TagKey::Atom(Fourcc(*b"\xa9alb")),
            (TagFormat::Mp4, Field::Cover) => TagKey::Atom(Fourcc(*b"covr")),
            // TIT2 / TITLE
            (_, Field::Title) => TagKey::Item(ItemKey::TrackTitle),
            // TPE1 / ARTIST
            (_, Field::Author) => TagKey::Item(ItemKey::TrackArtist),
            // TALB / ALBUM
            (_, Field::Series) => TagKey::Item(ItemKey::AlbumTitle),
            // APIC / METADATA_BLOCK_PICTURE
            (_, Field::Cover) => TagKey::Picture(PictureType::CoverFront),
        }
    }
}

/// Values written into every audio file of a book.
#[derive(Debug, Clone)]
pub struct TagPayload {
    pub title: String,
    pub author: String,
    pub series: String,
    pub cover: Option<CoverArt>,
}

impl TagPayload {
    pub fn new(metadata: &ResolvedMetadata, cover: Option<CoverArt>) -> Self {
        Self {
            title: metadata.title.clone(),
            author: metadata.author.clone(),
            series: metadata.series.clone(),
            cover,
        }
    }

    fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => Some(&self.title),
            Field::Author => Some(&self.author),
            Field::Series => Some(&self.series),
            Field::Cover => None,
        }
    }
}

/// Reads hints from and writes payloads into audio files.
pub trait TagStore {
    fn read_hint(&self, path: &Path) -> Result<TagHint>;
    fn write(&self, path: &Path, payload: &TagPayload) -> Result<()>;
}

/// Tag store backed by mp4ameta (MP4) and lofty (everything else).
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerTags;

impl ContainerTags {
    fn format_of(path: &Path) -> Result<TagFormat> {
        TagFormat::from_path(path)
            .with_context(|| format!("Unsupported format: {}", path.display()))
    }
}

impl TagStore for ContainerTags {
    fn read_hint(&self, path: &Path) -> Result<TagHint> {
        match Self::format_of(path)? {
            TagFormat::Mp4 => mp4::read_hint(path),
            format => lofty_tags::read_hint(path, format),
        }
    }

    fn write(&self, path: &Path, payload: &TagPayload) -> Result<()> {
        let format = Self::format_of(path)?;

        let metadata = std::fs::metadata(path)?;
        if metadata.len() == 0 {
            anyhow::bail!("File is empty (0 bytes)");
        }

        match format {
            TagFormat::Mp4 => mp4::write(path, payload),
            format => lofty_tags::write(path, format, payload),
        }
    }
}

// iTunes M4A/M4B files
mod mp4 {
    use super::*;
    use mp4ameta::{Data, Tag};

    fn atom(field: Field) -> Result<Fourcc> {
        match TagFormat::Mp4.key(field) {
            TagKey::Atom(atom) => Ok(atom),
            other => anyhow::bail!("{:?} is not an MP4 atom", other),
        }
    }

    pub fn read_hint(path: &Path) -> Result<TagHint> {
        let tag = Tag::read_from_path(path)?;
        let first = |field| -> Result<Option<String>> {
            Ok(tag.strings_of(&atom(field)?).next().and_then(non_blank))
        };

        Ok(TagHint {
            title: first(Field::Series)?,
            author: first(Field::Author)?,
        })
    }

    pub fn write(path: &Path, payload: &TagPayload) -> Result<()> {
        let mut tag = Tag::read_from_path(path)?;

        for field in TEXT_FIELDS {
            let atom = atom(field)?;
            tag.remove_data_of(&atom);
            if let Some(value) = payload.text(field) {
                tag.add_data(atom, Data::Utf8(value.to_string()));
            }
        }

        if let Some(cover) = &payload.cover {
            let atom = atom(Field::Cover)?;
            tag.remove_data_of(&atom);
            let data = if cover.is_png() {
                Data::Png(cover.data.clone())
            } else {
                Data::Jpeg(cover.data.clone())
            };
            tag.add_data(atom, data);
        }

        tag.write_to_path(path)?;
        Ok(())
    }
}

// MP3, FLAC, OGG, Opus
mod lofty_tags {
    use super::*;
    use lofty::config::WriteOptions;
    use lofty::file::{AudioFile, TaggedFileExt};
    use lofty::picture::{MimeType, Picture};
    use lofty::probe::Probe;
    use lofty::tag::Tag;

    pub fn read_hint(path: &Path, format: TagFormat) -> Result<TagHint> {
        let tagged_file = Probe::open(path)?.read()?;

        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            return Ok(TagHint::default());
        };

        let first = |field| match format.key(field) {
            TagKey::Item(key) => tag.get_string(&key).and_then(non_blank),
            _ => None,
        };

        Ok(TagHint {
            title: first(Field::Series),
            author: first(Field::Author),
        })
    }

    pub fn write(path: &Path, format: TagFormat, payload: &TagPayload) -> Result<()> {
        let mut tagged_file = Probe::open(path)?.read()?;

        if tagged_file.primary_tag().is_none() {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file
            .primary_tag_mut()
            .context("File has no writable tag")?;

        for field in TEXT_FIELDS {
            let TagKey::Item(key) = format.key(field) else {
                anyhow::bail!("{:?} has no text key for {:?}", format, field);
            };
            tag.remove_key(&key);
            if let Some(value) = payload.text(field) {
                tag.insert_text(key, value.to_string());
            }
        }

        if let Some(cover) = &payload.cover {
            let TagKey::Picture(picture_type) = format.key(Field::Cover) else {
                anyhow::bail!("{:?} has no picture slot", format);
            };
            let mime = if cover.is_png() { MimeType::Png } else { MimeType::Jpeg };

            tag.remove_picture_type(picture_type);
            tag.push_picture(Picture::new_unchecked(
                picture_type,
                Some(mime),
                None,
                cover.data.clone(),
            ));
        }

        tagged_file.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }
}
