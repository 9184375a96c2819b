//! Detail page model: the structured sections a record carries, in display order.

use serde::Serialize;
use serde_json::Value;

use crate::models::{value_text, ImportantLink, Record, TableRow};

/// Related records shown under a detail page.
pub const RELATED_LIMIT: usize = 4;

/// Labels for date keys that the generic split would render poorly.
const KEY_LABELS: &[(&str, &str)] = &[
    ("applicationStart", "Application Start Date"),
    ("applicationBegin", "Application Begin"),
    ("lastDate", "Last Date to Apply"),
    ("lastDateToApply", "Last Date to Apply"),
    ("feePaymentLastDate", "Last Date for Fee Payment"),
    ("correctionDate", "Correction Window"),
    ("examDate", "Exam Date"),
    ("cbtDate", "CBT Exam Date"),
    ("admitCardDate", "Admit Card Available"),
    ("admitCardRelease", "Admit Card Release"),
    ("answerKeyDate", "Answer Key Release"),
    ("resultDate", "Result Date"),
    ("notificationDate", "Notification Date"),
    ("interviewDate", "Interview Date"),
];

/// Turn a camelCase key into a display label.
///
/// Known keys use a fixed label; others get a space before each capital and an
/// uppercase first letter.
pub fn humanize_key(key: &str) -> String {
    if let Some((_, label)) = KEY_LABELS.iter().find(|(k, _)| *k == key) {
        return label.to_string();
    }

    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for c in key.chars() {
        if c.is_uppercase() && prev.is_some_and(|p| !p.is_whitespace()) {
            out.push(' ');
        }
        out.push(c);
        prev = Some(c);
    }

    let mut chars = out.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// `text` as a link target if it is an absolute http(s) URL.
fn web_url(text: &str) -> Option<String> {
    let text = text.trim();
    let lower = text.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")).then(|| text.to_string())
}

impl Cell {
    fn from_value(value: Option<&Value>) -> Self {
        let text = value.map(value_text).unwrap_or_default();
        if text.trim().is_empty() {
            return Self {
                text: "-".to_string(),
                href: None,
            };
        }
        let href = web_url(&text);
        Self { text, href }
    }

    /// A link whose target is dropped unless it is http(s).
    fn from_link(link: &ImportantLink) -> Self {
        Self {
            text: link.label.clone(),
            href: web_url(&link.url),
        }
    }
}

/// A rendered block of a detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Section {
    Dates {
        heading: &'static str,
        rows: Vec<LabelValue>,
    },
    Table {
        heading: &'static str,
        headers: Vec<&'static str>,
        rows: Vec<Vec<Cell>>,
    },
    Links {
        heading: &'static str,
        links: Vec<Cell>,
    },
}

/// A table section: heading plus fixed columns, each read from the first key present.
struct TableSpec {
    heading: &'static str,
    columns: &'static [(&'static str, &'static [&'static str])],
}

const VACANCY: TableSpec = TableSpec {
    heading: "Vacancy Details",
    columns: &[
        ("Post Name", &["postName", "post", "name"]),
        ("Total Posts", &["totalPosts", "posts", "total", "vacancies"]),
        ("Eligibility", &["eligibility", "qualification"]),
    ],
};

const SALARY: TableSpec = TableSpec {
    heading: "Salary",
    columns: &[
        ("Post", &["post", "postName"]),
        ("Pay Level", &["payLevel", "level"]),
        ("Pay Scale", &["payScale", "salary", "pay"]),
    ],
};

const SALARY_DETAILS: TableSpec = TableSpec {
    heading: "Salary Details",
    columns: &[
        ("Component", &["component", "label", "name"]),
        ("Amount", &["amount", "value"]),
    ],
};

const CUTOFF: TableSpec = TableSpec {
    heading: "Cut-off Marks",
    columns: &[
        ("Category", &["category"]),
        ("Cut-off", &["cutoff", "marks", "score"]),
    ],
};

const APPLICATION_FEE: TableSpec = TableSpec {
    heading: "Application Fee",
    columns: &[("Category", &["category"]), ("Fee", &["fee", "amount"])],
};

const RRB_RESULTS: TableSpec = TableSpec {
    heading: "RRB Region-wise Results",
    columns: &[
        ("RRB Region", &["region", "rrb", "zone"]),
        ("Result", &["link", "url", "resultLink", "status"]),
    ],
};

fn table(spec: &TableSpec, rows: &[TableRow]) -> Option<Section> {
    if rows.is_empty() {
        return None;
    }
    let rows = rows
        .iter()
        .map(|row| {
            spec.columns
                .iter()
                .map(|(_, keys)| Cell::from_value(keys.iter().find_map(|k| row.get(*k))))
                .collect::<Vec<Cell>>()
        })
        .collect();

    Some(Section::Table {
        heading: spec.heading,
        headers: spec.columns.iter().map(|(header, _)| *header).collect(),
        rows,
    })
}

/// Sections present on `record`, in fixed order; absent or empty ones are skipped.
pub fn build_sections(record: &Record) -> Vec<Section> {
    let mut sections = Vec::new();

    if let Some(dates) = record.important_dates.as_ref().filter(|d| !d.is_empty()) {
        sections.push(Section::Dates {
            heading: "Important Dates",
            rows: dates
                .iter()
                .map(|e| LabelValue {
                    label: humanize_key(&e.key),
                    value: e.value.clone(),
                })
                .collect(),
        });
    }

    let tables: [(&TableSpec, &Option<Vec<TableRow>>); 6] = [
        (&VACANCY, &record.vacancy),
        (&SALARY, &record.salary),
        (&SALARY_DETAILS, &record.salary_details),
        (&CUTOFF, &record.cutoff),
        (&APPLICATION_FEE, &record.application_fee),
        (&RRB_RESULTS, &record.rrb_results_data),
    ];
    for (spec, rows) in tables {
        if let Some(section) = rows.as_deref().and_then(|rows| table(spec, rows)) {
            sections.push(section);
        }
    }

    if let Some(links) = record.important_links.as_ref().filter(|l| !l.is_empty()) {
        sections.push(Section::Links {
            heading: "Important Links",
            links: links.iter().map(Cell::from_link).collect(),
        });
    }

    sections
}

/// Scalar facts shown in the page summary: known display fields, then unmodelled scalars.
pub fn overview(record: &Record) -> Vec<LabelValue> {
    let known = [
        ("Organization", record.organization.as_deref()),
        ("Department", record.department.as_deref()),
        ("Category", record.category.as_deref()),
        ("Exam Type", record.exam_type.as_deref()),
        ("Status", record.status.as_deref()),
        ("Post Date", record.post_date.as_deref()),
    ];

    let mut rows: Vec<LabelValue> = known
        .into_iter()
        .filter_map(|(label, value)| {
            value.filter(|v| !v.trim().is_empty()).map(|v| LabelValue {
                label: label.to_string(),
                value: v.to_string(),
            })
        })
        .collect();

    for (key, value) in &record.extra {
        if matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
            let text = value_text(value);
            if !text.trim().is_empty() {
                rows.push(LabelValue {
                    label: humanize_key(key),
                    value: text,
                });
            }
        }
    }

    rows
}

/// Up to `limit` records sharing category, organization or exam type with `record`.
///
/// `candidates` are taken in the order given.
pub fn related_records(candidates: Vec<Record>, record: &Record, limit: usize) -> Vec<Record> {
    candidates
        .into_iter()
        .filter(|c| c.is_related_to(record))
        .take(limit)
        .collect()
}
