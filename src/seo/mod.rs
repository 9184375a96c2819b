//! Page metadata and structured data.
//!
//! Everything here is a pure function of the resolved record(s) and the site settings;
//! nothing is fetched.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::models::{Category, Record};

pub const TITLE_LIMIT: usize = 60;
pub const KEYWORDS_LIMIT: usize = 100;
pub const DESCRIPTION_LIMIT: usize = 160;

const ELLIPSIS: &str = "...";
const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Keys of `importantDates` treated as the application deadline.
const DEADLINE_KEYS: &[&str] = &["lastDate", "lastDateToApply", "applicationEnd", "lastDateApply"];

/// Shorten `text` to fit `limit` characters.
///
/// Text up to `min(floor(limit * 0.95), limit - 3)` characters is returned as-is; longer text
/// is cut to that many characters and gets `...` appended.
pub fn truncate(text: &str, limit: usize) -> String {
    let keep = (limit * 95 / 100).min(limit.saturating_sub(ELLIPSIS.len()));
    if text.chars().count() <= keep {
        return text.to_string();
    }
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Site-wide settings the metadata is derived against.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    pub name: String,
    pub url: String,
}

/// schema.org type emitted for a category's detail pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    JobPosting,
    NewsArticle,
    CreativeWork,
    EducationalOccupationalProgram,
}

impl SchemaType {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Jobs => SchemaType::JobPosting,
            Category::Results | Category::Notifications => SchemaType::NewsArticle,
            Category::AdmitCards | Category::AnswerKeys => SchemaType::CreativeWork,
            Category::Syllabus | Category::Admissions => {
                SchemaType::EducationalOccupationalProgram
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::JobPosting => "JobPosting",
            SchemaType::NewsArticle => "NewsArticle",
            SchemaType::CreativeWork => "CreativeWork",
            SchemaType::EducationalOccupationalProgram => "EducationalOccupationalProgram",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenGraph {
    #[serde(rename = "type")]
    pub og_type: &'static str,
    pub title: String,
    pub description: String,
    pub url: String,
    pub site_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TwitterCard {
    pub card: &'static str,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Everything a page puts in its `<head>`.
#[derive(Debug, Clone, Serialize)]
pub struct SeoMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub canonical_url: String,
    pub robots: &'static str,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
    #[serde(skip)]
    pub json_ld: Option<Value>,
}

impl SeoMetadata {
    fn build(
        title: &str,
        description: &str,
        keywords: &str,
        canonical_url: String,
        og_type: &'static str,
        image: Option<String>,
        site: &SiteInfo,
    ) -> Self {
        let title = truncate(title, TITLE_LIMIT);
        let description = truncate(description, DESCRIPTION_LIMIT);
        let keywords = truncate(keywords, KEYWORDS_LIMIT);

        Self {
            open_graph: OpenGraph {
                og_type,
                title: title.clone(),
                description: description.clone(),
                url: canonical_url.clone(),
                site_name: site.name.clone(),
                image: image.clone(),
            },
            twitter: TwitterCard {
                card: if image.is_some() {
                    "summary_large_image"
                } else {
                    "summary"
                },
                title: title.clone(),
                description: description.clone(),
                image,
            },
            title,
            description,
            keywords,
            canonical_url,
            robots: "index, follow",
            json_ld: None,
        }
    }

    /// JSON-LD payload safe to place inside a `<script>` element.
    pub fn json_ld_script(&self) -> Option<String> {
        self.json_ld.as_ref().map(|value| {
            value
                .to_string()
                .replace('<', "\\u003c")
                .replace('>', "\\u003e")
                .replace('&', "\\u0026")
        })
    }
}

/// Metadata for one record's detail page.
pub fn detail_metadata(record: &Record, category: Category, site: &SiteInfo) -> SeoMetadata {
    let url = format!("{}{}", site.url, category.record_path(&record.id));
    let title = format!("{} | {}", record.display_title(), site.name);
    let description = describe(record, category);
    let keywords = keywords(record, category);
    let image = record.image_url.clone().filter(|u| !u.trim().is_empty());

    let mut meta = SeoMetadata::build(
        &title,
        &description,
        &keywords,
        url.clone(),
        "article",
        image,
        site,
    );
    meta.json_ld = Some(record_json_ld(record, category, &url, &meta.description, site));
    meta
}

/// Metadata for a category's list page; `records` are in display order.
pub fn list_metadata(category: Category, records: &[Record], site: &SiteInfo) -> SeoMetadata {
    let url = format!("{}/{}", site.url, category.route());
    let title = format!("{} | {}", category.label(), site.name);
    let description = format!(
        "Browse {} {} on {}: important dates, eligibility, fees and official links.",
        records.len(),
        category.label().to_lowercase(),
        site.name
    );
    let keywords = format!(
        "{}, sarkari {}, government exams",
        category.label().to_lowercase(),
        category.singular().to_lowercase()
    );

    let mut meta = SeoMetadata::build(&title, &description, &keywords, url, "website", None, site);
    meta.json_ld = Some(item_list_json_ld(category, records, site));
    meta
}

/// Metadata for the home page (latest jobs).
pub fn home_metadata(records: &[Record], site: &SiteInfo) -> SeoMetadata {
    let title = format!("{} - Government Jobs, Admit Cards & Results", site.name);
    let description = format!(
        "{} lists latest government jobs, admit cards, results, answer keys, syllabus and admissions.",
        site.name
    );
    let keywords = "sarkari result, government jobs, admit card, answer key, syllabus";

    let mut meta = SeoMetadata::build(
        &title,
        &description,
        keywords,
        site.url.clone(),
        "website",
        None,
        site,
    );
    meta.json_ld = Some(item_list_json_ld(Category::Jobs, records, site));
    meta
}

/// Fixed metadata for a record that could not be resolved.
pub fn not_found_metadata(category: Category, site: &SiteInfo) -> SeoMetadata {
    let title = format!("Not Found | {}", site.name);
    let description = format!(
        "The requested {} could not be found.",
        category.singular().to_lowercase()
    );
    let url = format!("{}/{}", site.url, category.route());

    let mut meta = SeoMetadata::build(&title, &description, "", url, "website", None, site);
    meta.robots = "noindex, nofollow";
    meta
}

fn describe(record: &Record, category: Category) -> String {
    if let Some(description) = record.description.as_deref().filter(|d| !d.trim().is_empty()) {
        return description.to_string();
    }

    let mut text = record.display_title().to_string();
    if let Some(org) = record.organization.as_deref().filter(|o| !o.trim().is_empty()) {
        text.push_str(" by ");
        text.push_str(org);
    }
    if let Some(status) = record.status.as_deref().filter(|s| !s.trim().is_empty()) {
        text.push_str(&format!(" ({})", status));
    }
    text.push_str(&format!(
        ". Check important dates, fees, vacancies and official links for this {}.",
        category.singular().to_lowercase()
    ));
    text
}

fn keywords(record: &Record, category: Category) -> String {
    if !record.keywords.is_empty() {
        return record.keywords.join(", ");
    }

    let mut words = vec![record.display_title().to_string()];
    if let Some(org) = record.organization.as_deref().filter(|o| !o.trim().is_empty()) {
        words.push(org.to_string());
    }
    words.push(category.singular().to_lowercase());
    words.join(", ")
}

/// Application deadline from `importantDates`, if the record carries one.
pub fn deadline(record: &Record) -> Option<&str> {
    let dates = record.important_dates.as_ref()?;
    DEADLINE_KEYS.iter().find_map(|key| {
        dates
            .iter()
            .find(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value.as_str())
    })
}

fn insert_str(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        map.insert(key.to_string(), Value::String(v.to_string()));
    }
}

fn organization(name: &str) -> Value {
    json!({ "@type": "Organization", "name": name })
}

fn record_json_ld(
    record: &Record,
    category: Category,
    url: &str,
    description: &str,
    site: &SiteInfo,
) -> Value {
    let schema = SchemaType::for_category(category);
    let name = record.display_title();
    let org = record.organization.as_deref().filter(|o| !o.trim().is_empty());

    let mut ld = Map::new();
    ld.insert("@context".to_string(), json!(SCHEMA_CONTEXT));
    ld.insert("@type".to_string(), json!(schema.as_str()));

    match schema {
        SchemaType::JobPosting => {
            ld.insert("title".to_string(), json!(name));
            ld.insert("description".to_string(), json!(description));
            insert_str(&mut ld, "datePosted", record.post_date.as_deref());
            insert_str(&mut ld, "validThrough", deadline(record));
            ld.insert("employmentType".to_string(), json!("FULL_TIME"));
            ld.insert(
                "hiringOrganization".to_string(),
                organization(org.unwrap_or(&site.name)),
            );
            ld.insert(
                "jobLocation".to_string(),
                json!({
                    "@type": "Place",
                    "address": { "@type": "PostalAddress", "addressCountry": "IN" }
                }),
            );
            if let Some(total) = total_posts(record) {
                ld.insert("totalJobOpenings".to_string(), json!(total));
            }
            ld.insert("url".to_string(), json!(url));
        }
        SchemaType::NewsArticle => {
            ld.insert("headline".to_string(), json!(truncate(name, 110)));
            ld.insert("description".to_string(), json!(description));
            insert_str(&mut ld, "datePublished", record.post_date.as_deref());
            ld.insert(
                "author".to_string(),
                organization(org.unwrap_or(&site.name)),
            );
            ld.insert("publisher".to_string(), organization(&site.name));
            ld.insert(
                "mainEntityOfPage".to_string(),
                json!({ "@type": "WebPage", "@id": url }),
            );
            insert_str(&mut ld, "image", record.image_url.as_deref());
        }
        SchemaType::CreativeWork => {
            ld.insert("name".to_string(), json!(name));
            ld.insert("description".to_string(), json!(description));
            ld.insert("url".to_string(), json!(url));
            if let Some(org) = org {
                ld.insert("creator".to_string(), organization(org));
            }
            if !record.keywords.is_empty() {
                ld.insert("keywords".to_string(), json!(record.keywords.join(", ")));
            }
            insert_str(&mut ld, "datePublished", record.post_date.as_deref());
        }
        SchemaType::EducationalOccupationalProgram => {
            ld.insert("name".to_string(), json!(name));
            ld.insert("description".to_string(), json!(description));
            ld.insert("url".to_string(), json!(url));
            if let Some(org) = org {
                ld.insert(
                    "provider".to_string(),
                    json!({ "@type": "EducationalOrganization", "name": org }),
                );
            }
            insert_str(&mut ld, "applicationDeadline", deadline(record));
        }
    }

    Value::Object(ld)
}

fn item_list_json_ld(category: Category, records: &[Record], site: &SiteInfo) -> Value {
    let items: Vec<Value> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "url": format!("{}{}", site.url, category.record_path(&record.id)),
                "name": record.display_title(),
            })
        })
        .collect();

    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "ItemList",
        "name": category.label(),
        "numberOfItems": items.len(),
        "itemListElement": items,
    })
}

/// Sum of numeric `totalPosts` across vacancy rows.
fn total_posts(record: &Record) -> Option<u64> {
    let rows = record.vacancy.as_ref()?;
    let mut total = 0u64;
    let mut seen = false;
    for row in rows {
        let count = match row.get("totalPosts") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        if let Some(count) = count {
            total += count;
            seen = true;
        }
    }
    seen.then_some(total)
}
