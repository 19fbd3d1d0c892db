use chrono::Utc;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::FetchError;
use crate::models::TenderRecord;
use crate::normalize::{parse_datetime, parse_money};

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

/// One Atom entry. The PLACSP business extensions (`cbc:` elements on the
/// wire) are matched by their local names, since the deserializer strips
/// namespace prefixes; all of them are optional on any given entry.
#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    updated: Option<String>,
    // Real entries carry several link elements (self, alternate, ...).
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(rename = "DeadlineDate")]
    deadline_date: Option<String>,
    #[serde(rename = "PartyName")]
    party_name: Option<String>,
    #[serde(rename = "NUTSCode")]
    nuts_code: Option<String>,
    #[serde(rename = "ItemClassificationCode")]
    classification_code: Option<String>,
    #[serde(rename = "TotalAmount")]
    total_amount: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
}

fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Parse an Atom feed payload into canonical tender records.
///
/// A structurally malformed document is a hard `FetchError`; missing or
/// unparseable entry fields degrade to defaults instead.
pub fn parse_payload(xml_text: &str, source: &str) -> Result<Vec<TenderRecord>, FetchError> {
    let feed: AtomFeed = from_str(xml_text)?;
    let ingested_at = Utc::now();

    let mut tenders = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let id = text(entry.id);
        let title = text(entry.title);
        let summary = text(entry.summary);
        let link = entry
            .links
            .into_iter()
            .filter_map(|l| l.href)
            .map(|href| href.trim().to_string())
            .find(|href| !href.is_empty())
            .unwrap_or_default();

        let published_at = entry
            .updated
            .as_deref()
            .and_then(parse_datetime)
            .unwrap_or(ingested_at);

        // Identifier fallback chain: entry id, then link, then title.
        let external_id = [&id, &link, &title]
            .into_iter()
            .find(|v| !v.is_empty())
            .cloned()
            .unwrap_or_default();

        tenders.push(TenderRecord {
            external_id,
            title,
            summary,
            link,
            published_at,
            deadline_at: entry.deadline_date.as_deref().and_then(parse_datetime),
            buyer_name: text(entry.party_name),
            region: text(entry.nuts_code),
            cpv: text(entry.classification_code),
            budget_amount: entry.total_amount.as_deref().and_then(parse_money),
            source: source.to_string(),
        });
    }

    Ok(tenders)
}
