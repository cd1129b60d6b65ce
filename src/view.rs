// Locations view model
//
// Everything the locations screen shows is derived here from the ranked
// locations and the workflow state, so any front end (terminal, web) renders
// the same screen. Row actions are routed back into the workflow controller.

use crate::entities::{Location, LocationCategory, Sale};
use crate::performance::{aggregate, RankedLocation};
use crate::workflow::{CrudWorkflowController, DELETE_LOCATION_MESSAGE, DELETE_LOCATION_TITLE};

pub const SCREEN_TITLE: &str = "Manage Locations";
pub const EMPTY_PLACEHOLDER: &str = "No locations found. Get started by adding a new location.";
pub const COLUMN_HEADERS: [&str; 4] = ["Location Name", "Category", "Activity Score", "Actions"];

/// Width of the textual score bar, in cells
pub const SCORE_BAR_WIDTH: usize = 20;

// ============================================================================
// CATEGORY STYLE TABLE
// ============================================================================

/// Visual tone of a category badge, independent of the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Blue,
    Purple,
}

const CATEGORY_STYLES: [(LocationCategory, BadgeTone); 2] = [
    (LocationCategory::DailyRotation, BadgeTone::Blue),
    (LocationCategory::SpecialEvent, BadgeTone::Purple),
];

pub fn category_style(category: LocationCategory) -> BadgeTone {
    CATEGORY_STYLES
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, tone)| *tone)
        .unwrap_or(BadgeTone::Purple)
}

// ============================================================================
// NAVIGATION
// ============================================================================

/// Route of a location's dashboard
pub fn dashboard_route(location_id: &str) -> String {
    format!("/locations/{}", urlencoding::encode(location_id))
}

/// Render `score` (0-100) as a fixed-width bar
pub fn score_bar(score: f64, width: usize) -> String {
    let clamped = score.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

// ============================================================================
// SCREEN MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub id: String,
    pub name: String,
    pub category: LocationCategory,
    pub category_label: &'static str,
    pub tone: BadgeTone,
    pub transactions: usize,
    pub transactions_label: String,
    pub score: f64,
    pub score_bar: String,
}

impl From<&RankedLocation> for LocationRow {
    fn from(ranked: &RankedLocation) -> Self {
        let location = &ranked.location;
        LocationRow {
            id: location.id.clone(),
            name: location.name.clone(),
            category: location.category,
            category_label: location.category.label(),
            tone: category_style(location.category),
            transactions: ranked.transactions,
            transactions_label: format!("{} transactions", ranked.transactions),
            score: ranked.score,
            score_bar: score_bar(ranked.score, SCORE_BAR_WIDTH),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Rows(Vec<LocationRow>),
    Placeholder(&'static str),
}

/// Inputs of the generic modal shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalProps {
    pub is_open: bool,
    pub title: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmProps {
    pub is_open: bool,
    pub title: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub title: &'static str,
    pub headers: [&'static str; 4],
    pub body: TableBody,
    pub form_modal: ModalProps,
    pub confirm_modal: ConfirmProps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    ViewDashboard,
    Edit,
    Delete,
}

/// Ranked locations ready for display
#[derive(Debug, Clone, Default)]
pub struct LocationsView {
    ranked: Vec<RankedLocation>,
}

impl LocationsView {
    pub fn new(locations: &[Location], sales: &[Sale]) -> Self {
        Self::from_ranked(aggregate(locations, sales))
    }

    /// Wrap an already ranked list (e.g. from `PerformanceCache`)
    pub fn from_ranked(ranked: Vec<RankedLocation>) -> Self {
        LocationsView { ranked }
    }

    pub fn ranked(&self) -> &[RankedLocation] {
        &self.ranked
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&RankedLocation> {
        self.ranked.get(index)
    }

    pub fn screen(&self, workflow: &CrudWorkflowController) -> Screen {
        let body = if self.ranked.is_empty() {
            TableBody::Placeholder(EMPTY_PLACEHOLDER)
        } else {
            TableBody::Rows(self.ranked.iter().map(LocationRow::from).collect())
        };

        Screen {
            title: SCREEN_TITLE,
            headers: COLUMN_HEADERS,
            body,
            form_modal: ModalProps {
                is_open: workflow.is_form_open(),
                title: workflow.form_title(),
            },
            confirm_modal: ConfirmProps {
                is_open: workflow.is_confirm_open(),
                title: DELETE_LOCATION_TITLE,
                message: DELETE_LOCATION_MESSAGE,
            },
        }
    }

    /// "Add Location" button
    pub fn add(&self, workflow: &mut CrudWorkflowController) {
        workflow.open_create();
    }

    /// Route a row button. Returns the navigation target for
    /// `ViewDashboard`; rows out of range are ignored.
    pub fn dispatch(
        &self,
        index: usize,
        action: RowAction,
        workflow: &mut CrudWorkflowController,
    ) -> Option<String> {
        let location = &self.ranked.get(index)?.location;

        match action {
            RowAction::ViewDashboard => return Some(dashboard_route(&location.id)),
            RowAction::Edit => workflow.open_edit(location.clone()),
            RowAction::Delete => workflow.request_delete(location.id.clone()),
        }

        None
    }
}
