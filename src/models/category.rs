//! Content categories and their fixed routing/storage configuration.

use serde::{Deserialize, Serialize};

/// One of the seven content domains served by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Jobs,
    AdmitCards,
    Results,
    Notifications,
    Syllabus,
    AnswerKeys,
    Admissions,
}

/// Record field a list page filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    ExamName,
    Organization,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Jobs,
        Category::AdmitCards,
        Category::Results,
        Category::Notifications,
        Category::Syllabus,
        Category::AnswerKeys,
        Category::Admissions,
    ];

    /// Path segment of the list page; detail pages live under it.
    pub fn route(&self) -> &'static str {
        match self {
            Category::Jobs => "jobs",
            Category::AdmitCards => "admit-card",
            Category::Results => "results",
            Category::Notifications => "notifications",
            Category::Syllabus => "syllabus",
            Category::AnswerKeys => "answer-key",
            Category::Admissions => "admission",
        }
    }

    /// Segment under `/api`, for categories the Read API exposes.
    pub fn api_segment(&self) -> Option<&'static str> {
        match self {
            Category::Jobs => Some("jobs"),
            Category::AdmitCards => Some("admitcards"),
            Category::Results => Some("results"),
            Category::Notifications => Some("notifications"),
            Category::Syllabus => Some("syllabus"),
            Category::AnswerKeys | Category::Admissions => None,
        }
    }

    /// Detail page path of a record; the id is percent-encoded as one path segment.
    pub fn record_path(&self, id: &str) -> String {
        format!("/{}/{}", self.route(), urlencoding::encode(id))
    }

    /// Collection name in the content store.
    pub fn collection(&self) -> &'static str {
        match self {
            Category::AnswerKeys => "answerkeys",
            Category::Admissions => "admissions",
            other => other.api_segment().unwrap_or("unknown"),
        }
    }

    /// Name of the bundled JSON array for this category.
    pub fn static_file(&self) -> &'static str {
        match self {
            Category::Jobs => "jobsData.json",
            Category::AdmitCards => "admitCardsData.json",
            Category::Results => "resultsData.json",
            Category::Notifications => "notificationsData.json",
            Category::Syllabus => "syllabusData.json",
            Category::AnswerKeys => "answerKeysData.json",
            Category::Admissions => "admissionsData.json",
        }
    }

    /// Plural heading used on list pages.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Jobs => "Latest Jobs",
            Category::AdmitCards => "Admit Cards",
            Category::Results => "Results",
            Category::Notifications => "Notifications",
            Category::Syllabus => "Syllabus",
            Category::AnswerKeys => "Answer Keys",
            Category::Admissions => "Admissions",
        }
    }

    /// Singular noun used in detail-page copy.
    pub fn singular(&self) -> &'static str {
        match self {
            Category::Jobs => "Job",
            Category::AdmitCards => "Admit Card",
            Category::Results => "Result",
            Category::Notifications => "Notification",
            Category::Syllabus => "Syllabus",
            Category::AnswerKeys => "Answer Key",
            Category::Admissions => "Admission",
        }
    }

    /// Fields the list-page search box matches against.
    pub fn search_fields(&self) -> &'static [SearchField] {
        match self {
            Category::Results | Category::Syllabus | Category::AnswerKeys => {
                &[SearchField::ExamName]
            }
            _ => &[SearchField::Title],
        }
    }

    /// Suffix of the `PORTAL_BINDING_*` variable for this category.
    pub fn env_key(&self) -> &'static str {
        match self {
            Category::Jobs => "JOBS",
            Category::AdmitCards => "ADMIT_CARDS",
            Category::Results => "RESULTS",
            Category::Notifications => "NOTIFICATIONS",
            Category::Syllabus => "SYLLABUS",
            Category::AnswerKeys => "ANSWER_KEYS",
            Category::Admissions => "ADMISSIONS",
        }
    }

    pub fn from_collection(collection: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.collection() == collection)
    }
}

/// Home page variant of the jobs list filters on title and organization.
pub const HOME_SEARCH_FIELDS: &[SearchField] = &[SearchField::Title, SearchField::Organization];
