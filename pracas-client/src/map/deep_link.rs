//! Map deep links (`?lat=..&lng=..&issueId=..`)

use shared::Coordinate;
use url::{Position, Url};

const RELATIVE_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeepLink {
    pub center: Option<Coordinate>,
    pub issue_id: Option<i64>,
}

impl DeepLink {
    /// Parse an absolute URL or a path with query string
    ///
    /// Unparsable or out-of-range values are ignored.
    pub fn parse(link: &str) -> Result<Self, url::ParseError> {
        let (url, _) = parse_any(link)?;
        let mut lat = None;
        let mut lng = None;
        let mut issue_id = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "lat" => lat = value.trim().parse::<f64>().ok(),
                "lng" => lng = value.trim().parse::<f64>().ok(),
                "issueId" => issue_id = value.trim().parse::<i64>().ok(),
                _ => {}
            }
        }
        let center = match (lat, lng) {
            (Some(lat), Some(lng)) => Coordinate::checked(lat, lng),
            _ => None,
        };
        Ok(Self { center, issue_id })
    }

    pub fn is_empty(&self) -> bool {
        self.center.is_none() && self.issue_id.is_none()
    }
}

/// The same link with only the `issueId` parameter removed
pub fn strip_issue_id(link: &str) -> Result<String, url::ParseError> {
    let (mut url, relative) = parse_any(link)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "issueId")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    Ok(if relative {
        url[Position::BeforePath..].to_string()
    } else {
        url.to_string()
    })
}

fn parse_any(link: &str) -> Result<(Url, bool), url::ParseError> {
    match Url::parse(link) {
        Ok(url) => Ok((url, false)),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Ok((Url::parse(RELATIVE_BASE)?.join(link)?, true))
        }
        Err(e) => Err(e),
    }
}
