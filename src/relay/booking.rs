use url::Url;

use crate::config::ConfigError;
use crate::widget::format::escape_html;

/// Phrases that mark a message as a request to meet a broker.
const BOOKING_KEYWORDS: &[&str] = &[
    "book",
    "schedule",
    "appointment",
    "meeting",
    "get an appointment",
    "see a broker",
    "meet",
    "consult",
    "call",
    "talk to",
    "speak to",
    "visit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingLink {
    pub label: String,
    pub url: Url,
}

/// Parses `label=url,label=url`. Blank segments are skipped.
pub fn parse_booking_links(raw: &str) -> Result<Vec<BookingLink>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (label, url) = segment
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidBookingLink(segment.to_string()))?;
            let label = label.trim();
            if label.is_empty() {
                return Err(ConfigError::InvalidBookingLink(segment.to_string()));
            }
            let url = Url::parse(url.trim())
                .map_err(|_| ConfigError::InvalidBookingLink(segment.to_string()))?;
            Ok(BookingLink { label: label.to_string(), url })
        })
        .collect()
}

/// Substring match on the lower-cased message, so "Can I call you?" and
/// "booking" both count.
pub fn is_booking_request(message: &str) -> bool {
    let lowered = message.to_lowercase();
    BOOKING_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

pub fn booking_reply(links: &[BookingLink]) -> String {
    let mut reply = String::from("You can book a time directly here:");
    for link in links {
        reply.push_str(&format!(
            "<br><a href='{}' target='_blank'>{}</a>",
            escape_html(link.url.as_str()),
            escape_html(&link.label)
        ));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_label_url_pairs() {
        let links = parse_booking_links(
            "15-minute Discovery Call=https://calendly.com/broker/15min, 30-minute Consultation=https://calendly.com/broker/30min,"
        ).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].label, "15-minute Discovery Call");
        assert_eq!(links[1].url.as_str(), "https://calendly.com/broker/30min");
    }

    #[test]
    fn rejects_segment_without_url() {
        assert!(matches!(
            parse_booking_links("Discovery Call"),
            Err(ConfigError::InvalidBookingLink(_))
        ));
        assert!(parse_booking_links("Call=not a url").is_err());
    }

    #[test]
    fn detects_booking_intent() {
        assert!(is_booking_request("Can I Schedule a chat?"));
        assert!(is_booking_request("I'd like to speak to someone"));
        assert!(!is_booking_request("What are current rates?"));
    }

    #[test]
    fn reply_lists_every_link() {
        let links = parse_booking_links("A=https://a.example/x,B=https://b.example/y").unwrap();
        let reply = booking_reply(&links);
        assert!(reply.starts_with("You can book a time directly here:"));
        assert!(reply.contains("<a href='https://a.example/x' target='_blank'>A</a>"));
        assert!(reply.contains("<a href='https://b.example/y' target='_blank'>B</a>"));
    }

    #[test]
    fn reply_escapes_configured_labels() {
        let links = vec![BookingLink {
            label: "<img src=x onerror=alert(1)> O'Brien".to_string(),
            url: Url::parse("https://calendly.com/broker/it's").unwrap(),
        }];
        let reply = booking_reply(&links);
        assert!(!reply.contains("<img"));
        assert!(reply.contains(">&lt;img src=x onerror=alert(1)&gt; O&#39;Brien</a>"));
        assert!(!reply.contains("it's"));
    }
}
