//! HLS playlists via `m3u8-rs`, reduced to what the segment engine needs.

use anyhow::{anyhow, Result};
use m3u8_rs::{AlternativeMediaType, MasterPlaylist, MediaPlaylist, Playlist};
use url::Url;

use crate::segment::SegmentSpec;

/// One variant stream of a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub url: Url,
    /// `BANDWIDTH` attribute.
    pub bandwidth: u64,
    /// `WIDTHxHEIGHT`, when advertised.
    pub resolution: Option<String>,
}

/// An `EXT-X-MEDIA` subtitle rendition with a URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub url: Url,
    pub language: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistKind {
    /// Variant streams (I-frame-only variants excluded) and subtitle tracks.
    Master {
        variants: Vec<Variant>,
        subtitles: Vec<SubtitleTrack>,
    },
    /// Segments in playback order. Each change of `EXT-X-MAP` inserts the
    /// new init segment before the first media segment it applies to.
    Media(Vec<SegmentSpec>),
}

impl PlaylistKind {
    /// Highest-bandwidth variant of a master playlist.
    pub fn best_variant(&self) -> Option<&Variant> {
        match self {
            PlaylistKind::Master { variants, .. } => variants.iter().max_by_key(|v| v.bandwidth),
            PlaylistKind::Media(_) => None,
        }
    }

    /// Subtitle tracks of a master playlist (empty for media playlists).
    pub fn subtitles(&self) -> &[SubtitleTrack] {
        match self {
            PlaylistKind::Master { subtitles, .. } => subtitles,
            PlaylistKind::Media(_) => &[],
        }
    }
}

/// Parse playlist `text` fetched from `base`.
pub fn parse_media_playlist(text: &str, base: &Url) -> Result<PlaylistKind> {
    match m3u8_rs::parse_playlist_res(text.as_bytes()) {
        Ok(Playlist::MasterPlaylist(pl)) => master(pl, base),
        Ok(Playlist::MediaPlaylist(pl)) => media(pl, base),
        Err(_) => Err(anyhow!("{} is not a valid M3U8 playlist", base)),
    }
}

fn master(pl: MasterPlaylist, base: &Url) -> Result<PlaylistKind> {
    let variants = pl
        .variants
        .into_iter()
        .filter(|v| !v.is_i_frame)
        .map(|v| {
            Ok(Variant {
                url: super::resolve(Some(base), &v.uri)?,
                bandwidth: v.bandwidth,
                resolution: v.resolution.map(|r| format!("{}x{}", r.width, r.height)),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let subtitles = pl
        .alternatives
        .into_iter()
        .filter(|m| matches!(m.media_type, AlternativeMediaType::Subtitles))
        .filter_map(|m| {
            let uri = m.uri?;
            Some(super::resolve(Some(base), &uri).map(|url| SubtitleTrack {
                url,
                language: m.language,
                name: m.name,
            }))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PlaylistKind::Master { variants, subtitles })
}

fn media(pl: MediaPlaylist, base: &Url) -> Result<PlaylistKind> {
    // An EXT-X-MAP ahead of the first segment is left in `unknown_tags`.
    let mut current_map = leading_map_uri(&pl);
    let mut last_emitted: Option<String> = None;
    let mut urls = Vec::with_capacity(pl.segments.len() + 1);
    for segment in &pl.segments {
        if let Some(map) = &segment.map {
            current_map = Some(map.uri.clone());
        }
        if let Some(map_uri) = &current_map {
            if last_emitted.as_ref() != Some(map_uri) {
                urls.push(super::resolve(Some(base), map_uri)?);
                last_emitted = Some(map_uri.clone());
            }
        }
        urls.push(super::resolve(Some(base), &segment.uri)?);
    }
    Ok(PlaylistKind::Media(super::number(urls)?))
}

fn leading_map_uri(pl: &MediaPlaylist) -> Option<String> {
    let tag = pl.unknown_tags.iter().find(|t| t.tag == "X-MAP")?;
    let rest = tag.rest.as_deref()?;
    let start = rest.find("URI=\"")? + "URI=\"".len();
    let len = rest[start..].find('"')?;
    Some(rest[start..start + len].to_string())
}
