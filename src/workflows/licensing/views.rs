//! Read-only projections over the record set.
//!
//! Everything here is a pure function of the full application list plus the
//! caller's identity: role scoping, rejected/active modes, tab facets,
//! free-text search, sorting, pagination, and the dashboard counts. Nothing
//! in this module touches the store or the engine.

use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationStatus, LicenseKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Requests,
    Rejected,
}

/// Three-way split the register pages offer above the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestsTab {
    #[default]
    All,
    NewOrExtension,
    InProgress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone)]
pub struct RequestQuery {
    pub mode: ViewMode,
    pub tab: RequestsTab,
    pub search: Option<String>,
    pub sort: SortOrder,
    /// 1-indexed; an out-of-range page resets to 1.
    pub page: usize,
    pub page_size: usize,
}

impl Default for RequestQuery {
    fn default() -> Self {
        Self {
            mode: ViewMode::default(),
            tab: RequestsTab::default(),
            search: None,
            sort: SortOrder::default(),
            page: 1,
            page_size: 10,
        }
    }
}

/// One page of a filtered, sorted register view.
#[derive(Debug, Clone, Serialize)]
pub struct RequestPage {
    pub items: Vec<Application>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

/// Register view for a sectional manager: the requests routed to them.
pub fn sectional_requests(
    applications: &[Application],
    manager: &str,
    query: &RequestQuery,
) -> RequestPage {
    let matches = applications.iter().filter(|application| {
        if application.sectional_manager != manager {
            return false;
        }
        let mode_matches = match query.mode {
            ViewMode::Requests => application.status != ApplicationStatus::RejectedSectional,
            ViewMode::Rejected => application.status == ApplicationStatus::RejectedSectional,
        };
        if !mode_matches {
            return false;
        }
        let tab_matches = match (query.mode, query.tab) {
            (ViewMode::Rejected, _) | (_, RequestsTab::All) => true,
            (_, RequestsTab::NewOrExtension) => {
                application.status == ApplicationStatus::PendingSectional
            }
            (_, RequestsTab::InProgress) => {
                application.status == ApplicationStatus::ApprovedSectional
            }
        };
        tab_matches && search_matches(application, query.search.as_deref())
    });

    paginate(matches, query)
}

/// Register view for a safety manager: everything at the safety stage or
/// later. Records an acting safety manager has claimed are scoped to that
/// manager; unclaimed records form a pool visible to every safety manager.
pub fn safety_requests(
    applications: &[Application],
    manager: &str,
    query: &RequestQuery,
) -> RequestPage {
    let matches = applications.iter().filter(|application| {
        if !visible_to_safety(application, manager) {
            return false;
        }
        let mode_matches = match query.mode {
            ViewMode::Requests => application.status != ApplicationStatus::RejectedSafety,
            ViewMode::Rejected => application.status == ApplicationStatus::RejectedSafety,
        };
        if !mode_matches {
            return false;
        }
        let tab_matches = match (query.mode, query.tab) {
            (ViewMode::Rejected, _) | (_, RequestsTab::All) => true,
            (_, RequestsTab::NewOrExtension) => matches!(
                application.status,
                ApplicationStatus::ApprovedSectional | ApplicationStatus::PendingSafety
            ),
            (_, RequestsTab::InProgress) => matches!(
                application.status,
                ApplicationStatus::OrientationAssigned
                    | ApplicationStatus::OrientationCompleted
                    | ApplicationStatus::PracticalAssigned
                    | ApplicationStatus::PracticalCompleted
                    | ApplicationStatus::MedicalPending
                    | ApplicationStatus::MedicalCompleted
            ),
        };
        tab_matches && search_matches(application, query.search.as_deref())
    });

    paginate(matches, query)
}

fn visible_to_safety(application: &Application, manager: &str) -> bool {
    application.status.in_safety_band()
        && application
            .safety_manager
            .as_deref()
            .map_or(true, |assigned| assigned == manager)
}

fn search_matches(application: &Application, search: Option<&str>) -> bool {
    let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) else {
        return true;
    };
    let term = term.to_lowercase();
    application.reference_number.to_lowercase().contains(&term)
        || application.applicant.name.to_lowercase().contains(&term)
        || application
            .applicant
            .staff_number
            .to_lowercase()
            .contains(&term)
}

fn paginate<'a>(
    matches: impl Iterator<Item = &'a Application>,
    query: &RequestQuery,
) -> RequestPage {
    let mut matched: Vec<&Application> = matches.collect();
    match query.sort {
        SortOrder::NewestFirst => {
            matched.sort_by(|a, b| b.submitted_on.cmp(&a.submitted_on));
        }
        SortOrder::OldestFirst => {
            matched.sort_by(|a, b| a.submitted_on.cmp(&b.submitted_on));
        }
    }

    let page_size = query.page_size.max(1);
    let total_matches = matched.len();
    let total_pages = (total_matches.div_ceil(page_size)).max(1);
    let page = if query.page == 0 || query.page > total_pages {
        1
    } else {
        query.page
    };

    let start = (page - 1) * page_size;
    let items = matched
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    RequestPage {
        items,
        page,
        total_pages,
        total_matches,
    }
}

/// Sectional dashboard tiles, derived by predicate, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionalCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total: usize,
}

pub fn sectional_counts(applications: &[Application], manager: &str) -> SectionalCounts {
    let mine: Vec<&Application> = applications
        .iter()
        .filter(|application| application.sectional_manager == manager)
        .collect();
    SectionalCounts {
        pending: count_status(&mine, ApplicationStatus::PendingSectional),
        approved: count_status(&mine, ApplicationStatus::ApprovedSectional),
        rejected: count_status(&mine, ApplicationStatus::RejectedSectional),
        total: mine.len(),
    }
}

/// Safety dashboard tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetyCounts {
    pub awaiting_validation: usize,
    pub in_training: usize,
    pub rejected: usize,
    pub total: usize,
}

pub fn safety_counts(applications: &[Application], manager: &str) -> SafetyCounts {
    let mine: Vec<&Application> = applications
        .iter()
        .filter(|application| visible_to_safety(application, manager))
        .collect();
    SafetyCounts {
        awaiting_validation: mine
            .iter()
            .filter(|application| {
                matches!(
                    application.status,
                    ApplicationStatus::ApprovedSectional | ApplicationStatus::PendingSafety
                )
            })
            .count(),
        in_training: mine
            .iter()
            .filter(|application| {
                matches!(
                    application.status,
                    ApplicationStatus::OrientationAssigned
                        | ApplicationStatus::OrientationCompleted
                        | ApplicationStatus::PracticalAssigned
                        | ApplicationStatus::PracticalCompleted
                )
            })
            .count(),
        rejected: count_status(&mine, ApplicationStatus::RejectedSafety),
        total: mine.len(),
    }
}

fn count_status(applications: &[&Application], status: ApplicationStatus) -> usize {
    applications
        .iter()
        .filter(|application| application.status == status)
        .count()
}

/// Chip text shown next to a row in the register tables.
pub fn chip_label(application: &Application) -> &'static str {
    match application.status {
        ApplicationStatus::ApprovedSafety => "On going",
        ApplicationStatus::OrientationAssigned => "Orientation Assigned",
        ApplicationStatus::OrientationCompleted => "Orientation Done",
        ApplicationStatus::PracticalAssigned => "Practical Assigned",
        ApplicationStatus::PracticalCompleted => "Practical Done",
        ApplicationStatus::MedicalPending => "Medical Pending",
        ApplicationStatus::MedicalCompleted => "Medical Completed",
        ApplicationStatus::DoctorApproved => "Doctor Approved",
        ApplicationStatus::LicenseIssued => "License Issued",
        ApplicationStatus::RejectedSectional | ApplicationStatus::RejectedSafety => "Rejected",
        ApplicationStatus::PendingSectional
        | ApplicationStatus::ApprovedSectional
        | ApplicationStatus::PendingSafety => match application.license.kind {
            LicenseKind::Extension => "Extension",
            LicenseKind::New => "New",
        },
    }
}

/// Pager rail entry: a page number or an ellipsis gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

/// Windowed page-number rail: every page when there are at most seven,
/// otherwise first, a window around the current page, and last, with
/// ellipsis markers in the gaps.
pub fn page_numbers(current: usize, total_pages: usize) -> Vec<PageMarker> {
    if total_pages <= 7 {
        return (1..=total_pages.max(1)).map(PageMarker::Page).collect();
    }

    let mut rail = vec![PageMarker::Page(1)];
    if current > 3 {
        rail.push(PageMarker::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(total_pages - 1);
    for page in start..=end {
        rail.push(PageMarker::Page(page));
    }

    if current + 2 < total_pages {
        rail.push(PageMarker::Ellipsis);
    }
    rail.push(PageMarker::Page(total_pages));
    rail
}
