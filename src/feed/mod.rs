//! RSS 2.0 rendering with the iTunes image extension.

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use url::Url;

use crate::app::{PodcastError, Result};
use crate::config::ChannelConfig;
use crate::domain::episode::file_name;
use crate::domain::Episode;

pub const LANGUAGE: &str = "en-us";
const ITUNES_NAMESPACE: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
const AUDIO_MIME: &str = "audio/mpeg";

/// Render the channel and its episodes as an indented RSS document.
///
/// `now` becomes the channel's `pubDate` and `lastBuildDate`. Each
/// `<enclosure length>` carries the recorded audio size rather than the
/// conventional `"0"` placeholder.
pub fn render_rss(channel: &ChannelConfig, episodes: &[Episode], now: DateTime<Utc>) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let now = rfc1123z(now);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("rss").with_attributes([
            ("version", "2.0"),
            ("xmlns:itunes", ITUNES_NAMESPACE),
        ])))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .map_err(xml_error)?;

    text_element(&mut writer, "title", &channel.title)?;
    text_element(&mut writer, "link", &channel.link)?;
    text_element(&mut writer, "description", &channel.description)?;
    text_element(&mut writer, "language", LANGUAGE)?;
    text_element(&mut writer, "pubDate", &now)?;
    text_element(&mut writer, "lastBuildDate", &now)?;

    if let Some(first) = episodes.first() {
        let href = public_url(&channel.link, &first.illustration_file)?;
        itunes_image(&mut writer, &href)?;
    }

    for episode in episodes {
        write_item(&mut writer, channel, episode)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .map_err(xml_error)?;

    String::from_utf8(writer.into_inner()).map_err(|e| PodcastError::Feed(e.to_string()))
}

fn write_item(writer: &mut Writer<Vec<u8>>, channel: &ChannelConfig, episode: &Episode) -> Result<()> {
    let link = public_url(&channel.link, &episode.content_file)?;
    let audio = public_url(&channel.link, &episode.audio_file)?;
    let image = public_url(&channel.link, &episode.illustration_file)?;
    let length = episode.audio_length.to_string();

    writer
        .write_event(Event::Start(BytesStart::new("item")))
        .map_err(xml_error)?;

    text_element(writer, "title", &episode.title())?;
    text_element(writer, "link", &link)?;
    text_element(writer, "description", &episode.summary)?;
    text_element(writer, "pubDate", &rfc1123z(episode.created_at))?;
    text_element(writer, "guid", &link)?;

    writer
        .write_event(Event::Empty(BytesStart::new("enclosure").with_attributes([
            ("url", audio.as_str()),
            ("length", length.as_str()),
            ("type", AUDIO_MIME),
        ])))
        .map_err(xml_error)?;
    itunes_image(writer, &image)?;

    writer
        .write_event(Event::End(BytesEnd::new("item")))
        .map_err(xml_error)?;
    Ok(())
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))
        .map_err(xml_error)?;
    Ok(())
}

fn itunes_image(writer: &mut Writer<Vec<u8>>, href: &str) -> Result<()> {
    writer
        .write_event(Event::Empty(
            BytesStart::new("itunes:image").with_attributes([("href", href)]),
        ))
        .map_err(xml_error)
}

/// Public URL of an artifact: the channel link with the file name appended
/// as a path segment.
fn public_url(link: &str, file: &std::path::Path) -> Result<String> {
    let mut url = Url::parse(link)
        .map_err(|e| PodcastError::Feed(format!("invalid channel link {:?}: {}", link, e)))?;
    url.path_segments_mut()
        .map_err(|_| PodcastError::Feed(format!("channel link {:?} cannot be a base", link)))?
        .pop_if_empty()
        .push(&file_name(file));
    Ok(url.to_string())
}

/// RFC 1123 with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 +0000`.
pub fn rfc1123z(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

fn xml_error<E: std::fmt::Display>(e: E) -> PodcastError {
    PodcastError::Feed(e.to_string())
}
