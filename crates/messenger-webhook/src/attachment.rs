//! Message attachments
//!
//! An attachment is either rich media (image, video, audio, file, template,
//! fallback link) or a shared location. Attachments the classifier cannot
//! recognize are kept as rich media with an unknown type so that indices stay
//! aligned with the source array.

use crate::json::{self, Object};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rich media attachment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RichMediaType {
    Image,
    Video,
    Audio,
    File,
    Template,
    Fallback,
}

impl RichMediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::File => "file",
            Self::Template => "template",
            Self::Fallback => "fallback",
        }
    }

    /// Maps the wire `type` value; unknown values return `None`.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "file" => Some(Self::File),
            "template" => Some(Self::Template),
            "fallback" => Some(Self::Fallback),
            _ => None,
        }
    }
}

/// Media attachment referenced by URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichMediaAttachment {
    /// `None` when the platform sent a type this crate does not know
    pub kind: Option<RichMediaType>,
    /// Templates echoed back to the page carry no URL
    pub url: Option<String>,
}

/// Shared location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationAttachment {
    pub latitude: f64,
    pub longitude: f64,
}

/// A message attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attachment_type", rename_all = "snake_case")]
pub enum Attachment {
    RichMedia(RichMediaAttachment),
    Location(LocationAttachment),
}

impl Attachment {
    pub fn is_rich_media(&self) -> bool {
        matches!(self, Attachment::RichMedia(_))
    }

    pub fn is_location(&self) -> bool {
        matches!(self, Attachment::Location(_))
    }

    /// Narrows to the rich media variant.
    ///
    /// # Panics
    ///
    /// Panics if this is a location attachment. Check [`Attachment::is_rich_media`]
    /// first.
    #[track_caller]
    pub fn as_rich_media(&self) -> &RichMediaAttachment {
        match self {
            Attachment::RichMedia(a) => a,
            Attachment::Location(_) => {
                panic!("attachment is a location attachment, not a rich media attachment")
            }
        }
    }

    /// Narrows to the location variant.
    ///
    /// # Panics
    ///
    /// Panics if this is a rich media attachment. Check [`Attachment::is_location`]
    /// first.
    #[track_caller]
    pub fn as_location(&self) -> &LocationAttachment {
        match self {
            Attachment::Location(a) => a,
            Attachment::RichMedia(_) => {
                panic!("attachment is a rich media attachment, not a location attachment")
            }
        }
    }
}

/// Parses one raw attachment object.
///
/// Never fails: anything that is neither a well-formed location nor a known
/// media type becomes a rich media attachment with `kind: None`.
pub fn parse_attachment(raw: &Value) -> Attachment {
    let Some(obj) = raw.as_object() else {
        return Attachment::RichMedia(RichMediaAttachment { kind: None, url: None });
    };

    let payload = json::object(obj, "payload");

    if let Some(location) = payload.and_then(parse_coordinates) {
        return Attachment::Location(location);
    }

    let kind = json::string(obj, "type").and_then(|t| RichMediaType::from_wire(&t));
    let url = payload
        .and_then(|p| json::string(p, "url"))
        .or_else(|| json::string(obj, "url"));

    Attachment::RichMedia(RichMediaAttachment { kind, url })
}

/// Parses the `attachments` array, one output per input element.
pub fn parse_attachments(raw: &[Value]) -> Vec<Attachment> {
    raw.iter().map(parse_attachment).collect()
}

fn parse_coordinates(payload: &Object) -> Option<LocationAttachment> {
    let coordinates = json::object(payload, "coordinates")?;
    Some(LocationAttachment {
        latitude: json::float(coordinates, "lat")?,
        longitude: json::float(coordinates, "long")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_attachment() {
        let attachment = parse_attachment(&json!({
            "type": "image",
            "payload": { "url": "IMAGE_URL" }
        }));

        assert!(attachment.is_rich_media());
        assert!(!attachment.is_location());
        let media = attachment.as_rich_media();
        assert_eq!(media.kind, Some(RichMediaType::Image));
        assert_eq!(media.url.as_deref(), Some("IMAGE_URL"));
    }

    #[test]
    fn test_location_attachment() {
        let attachment = parse_attachment(&json!({
            "type": "location",
            "payload": { "coordinates": { "lat": 52.3765533, "long": 9.7389123 } }
        }));

        let location = attachment.as_location();
        assert_eq!(location.latitude, 52.3765533);
        assert_eq!(location.longitude, 9.7389123);
    }

    #[test]
    fn test_integer_coordinates() {
        let attachment = parse_attachment(&json!({
            "type": "location",
            "payload": { "coordinates": { "lat": 52, "long": 9 } }
        }));

        assert_eq!(*attachment.as_location(), LocationAttachment { latitude: 52.0, longitude: 9.0 });
    }

    #[test]
    fn test_location_without_coordinates_is_kept() {
        let attachment = parse_attachment(&json!({ "type": "location", "payload": {} }));

        let media = attachment.as_rich_media();
        assert_eq!(media.kind, None);
        assert_eq!(media.url, None);
    }

    #[test]
    fn test_unknown_type_falls_back_to_rich_media() {
        let attachment = parse_attachment(&json!({
            "type": "hologram",
            "payload": { "url": "HOLO_URL" }
        }));

        let media = attachment.as_rich_media();
        assert_eq!(media.kind, None);
        assert_eq!(media.url.as_deref(), Some("HOLO_URL"));
    }

    #[test]
    fn test_template_echo_without_url() {
        let attachment = parse_attachment(&json!({
            "title": "Samsung Gear VR, Oculus Rift",
            "url": null,
            "type": "template",
            "payload": { "template_type": "receipt" }
        }));

        let media = attachment.as_rich_media();
        assert_eq!(media.kind, Some(RichMediaType::Template));
        assert_eq!(media.url, None);
    }

    #[test]
    fn test_fallback_uses_top_level_url() {
        let attachment = parse_attachment(&json!({
            "title": "Shared link",
            "url": "https://example.com/article",
            "type": "fallback",
            "payload": null
        }));

        let media = attachment.as_rich_media();
        assert_eq!(media.kind, Some(RichMediaType::Fallback));
        assert_eq!(media.url.as_deref(), Some("https://example.com/article"));
    }

    #[test]
    fn test_positions_preserved() {
        let raw = vec![
            json!({ "type": "video", "payload": { "url": "V" } }),
            json!("not an object"),
            json!({ "type": "audio", "payload": { "url": "A" } }),
        ];

        let attachments = parse_attachments(&raw);
        assert_eq!(attachments.len(), 3);
        assert_eq!(attachments[0].as_rich_media().kind, Some(RichMediaType::Video));
        assert_eq!(attachments[1].as_rich_media().kind, None);
        assert_eq!(attachments[2].as_rich_media().url.as_deref(), Some("A"));
    }

    #[test]
    #[should_panic(expected = "not a location attachment")]
    fn test_wrong_narrowing_panics() {
        let attachment = parse_attachment(&json!({ "type": "file", "payload": { "url": "F" } }));
        attachment.as_location();
    }

    #[test]
    fn test_narrowing_panic_reports_caller_line() {
        use std::sync::{Arc, Mutex};

        let reported = Arc::new(Mutex::new(None));
        let sink = reported.clone();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let payload = info.payload();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            if message.contains("not a location attachment") {
                *sink.lock().unwrap() = info.location().map(|l| (l.file().to_string(), l.line()));
            }
        }));

        let attachment = parse_attachment(&json!({ "type": "image", "payload": { "url": "I" } }));
        let call_line = line!() + 1;
        let result = std::panic::catch_unwind(|| attachment.as_location().latitude);
        std::panic::set_hook(previous);

        assert!(result.is_err());
        let (file, line) = reported.lock().unwrap().clone().unwrap();
        assert!(file.ends_with("attachment.rs"));
        assert_eq!(line, call_line);
    }
}
