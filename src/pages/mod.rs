//! Server-rendered pages: home, per-category list and detail.
//!
//! Each page resolves its data once and feeds the same records to the body and to the
//! SEO metadata.

mod detail;
mod listing;
mod templates;

pub use detail::*;
pub use listing::*;
pub use templates::*;

use axum::response::Html;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Category, SearchField, HOME_SEARCH_FIELDS};
use crate::seo::{self, SeoMetadata};
use crate::AppState;

/// Query string of list pages.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
struct NavLink {
    href: String,
    label: &'static str,
}

fn nav_links() -> Vec<NavLink> {
    Category::ALL
        .iter()
        .map(|c| NavLink {
            href: format!("/{}", c.route()),
            label: c.label(),
        })
        .collect()
}

/// Shared page chrome plus the page-specific body fields.
#[derive(Serialize)]
struct Page<'a, B: Serialize> {
    seo: &'a SeoMetadata,
    json_ld: Option<String>,
    site_name: &'a str,
    nav: Vec<NavLink>,
    #[serde(flatten)]
    body: B,
}

fn render_page<B: Serialize>(
    state: &AppState,
    template: &str,
    seo: &SeoMetadata,
    body: B,
) -> Result<Html<String>, AppError> {
    let page = Page {
        seo,
        json_ld: seo.json_ld_script(),
        site_name: &state.site.name,
        nav: nav_links(),
        body,
    };
    Ok(Html(state.templates.render(template, page)?))
}

#[derive(Serialize)]
struct ListBody {
    heading: &'static str,
    action: String,
    placeholder: &'static str,
    view: ListView,
}

#[derive(Serialize)]
struct HomeBody {
    view: ListView,
}

#[derive(Serialize)]
struct DetailBody {
    title: String,
    description: Option<String>,
    overview: Vec<LabelValue>,
    sections: Vec<Section>,
    keywords: Vec<String>,
    related: Vec<ListItem>,
    back_href: String,
    back_label: &'static str,
}

#[derive(Serialize)]
struct NotFoundBody {
    singular: &'static str,
    back_href: String,
    back_label: &'static str,
}

/// GET / - Latest jobs, searchable by title and organization.
pub async fn home(state: AppState, params: SearchParams) -> Result<Html<String>, AppError> {
    let fetched = state.catalog.list_or_empty(Category::Jobs).await;
    let (view, shown) = ListView::build(fetched, Category::Jobs, &params.q, HOME_SEARCH_FIELDS);
    let seo = seo::home_metadata(&shown, &state.site);

    render_page(&state, "home.html", &seo, HomeBody { view })
}

/// GET /{route} - All records of a category, newest first, filtered by `q`.
pub async fn list_page(
    state: AppState,
    category: Category,
    params: SearchParams,
) -> Result<Html<String>, AppError> {
    let fields = category.search_fields();
    let fetched = state.catalog.list_or_empty(category).await;
    let (view, shown) = ListView::build(fetched, category, &params.q, fields);
    let seo = seo::list_metadata(category, &shown, &state.site);

    let placeholder = if fields.contains(&SearchField::ExamName) {
        "Search by exam name"
    } else {
        "Search by title"
    };

    render_page(
        &state,
        "list.html",
        &seo,
        ListBody {
            heading: category.label(),
            action: format!("/{}", category.route()),
            placeholder,
            view,
        },
    )
}

/// GET /{route}/{id} - One record, or the not-found view.
pub async fn detail_page(
    state: AppState,
    category: Category,
    id: String,
) -> Result<Html<String>, AppError> {
    let back_href = format!("/{}", category.route());

    let Some(record) = state.catalog.find_or_none(category, &id).await else {
        tracing::info!("{:?} record {} not found", category, id);
        let seo = seo::not_found_metadata(category, &state.site);
        return render_page(
            &state,
            "not_found.html",
            &seo,
            NotFoundBody {
                singular: category.singular(),
                back_href,
                back_label: category.label(),
            },
        );
    };

    let fields = category.search_fields();
    let candidates = newest_first(state.catalog.list_or_empty(category).await);
    let related = related_records(candidates, &record, RELATED_LIMIT)
        .iter()
        .map(|r| ListItem::new(r, category, fields))
        .collect();

    let seo = seo::detail_metadata(&record, category, &state.site);

    render_page(
        &state,
        "detail.html",
        &seo,
        DetailBody {
            title: record.display_title().to_string(),
            description: record.description.clone().filter(|d| !d.trim().is_empty()),
            overview: overview(&record),
            sections: build_sections(&record),
            keywords: record.keywords.clone(),
            related,
            back_href,
            back_label: category.label(),
        },
    )
}
