//! Dashboard view state
//!
//! Every flag the administrative dashboard keeps lives in
//! [`DashboardState`], grouped by concern. Transitions go through
//! [`DashboardState::reduce`] and never touch the network.

use serde::{Deserialize, Serialize};

use crate::models::{Attraction, AttractionDraft};
use crate::services::{AttractionForm, DeliveryForm, DeliveryReceipt};
use crate::stats::clamp_page;
use crate::utils::helpers::format_kg;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Session probe not finished yet
    #[default]
    Checking,
    SignedOut,
    SignedIn { email: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Overview,
    Collection,
    Schedule,
    Settings,
}

/// Search box and current page of the collection table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    /// 1-based
    pub page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
        }
    }
}

/// Open delivery modal bound to one participant
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryModal {
    pub participant_id: String,
    pub participant_name: String,
    pub form: DeliveryForm,
}

/// Record waiting for the second step of a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Participant { id: String, name: String },
    Attraction { id: String, name: String },
}

impl DeleteTarget {
    pub fn id(&self) -> &str {
        match self {
            DeleteTarget::Participant { id, .. } | DeleteTarget::Attraction { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DeleteTarget::Participant { name, .. } | DeleteTarget::Attraction { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Toast-style message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    pub auth: AuthState,
    pub tab: Tab,
    pub filter: FilterState,
    pub delivery: Option<DeliveryModal>,
    /// Participant whose detail modal is open
    pub detail: Option<String>,
    pub pending_delete: Option<DeleteTarget>,
    pub attraction_form: AttractionForm,
    pub notice: Option<Notice>,
    pub last_confirmed: Option<DeliveryReceipt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SignedIn { email: Option<String> },
    SignedOut,
    SelectTab(Tab),
    SetQuery(String),
    GoToPage(usize),
    OpenDelivery { participant_id: String, participant_name: String },
    SelectFood(String),
    SetCustomFood(String),
    SetWeight(f64),
    CloseDelivery,
    DeliveryConfirmed(DeliveryReceipt),
    ShowDetail(String),
    CloseDetail,
    RequestDelete(DeleteTarget),
    CancelDelete,
    DeleteCompleted,
    EditAttraction(Attraction),
    UpdateAttractionDraft(AttractionDraft),
    CancelAttractionEdit,
    Notify(Notice),
    DismissNotice,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.auth, AuthState::SignedIn { .. })
    }

    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::SignedIn { email } => {
                self.auth = AuthState::SignedIn { email };
            }
            Action::SignedOut => {
                return Self {
                    auth: AuthState::SignedOut,
                    ..Self::default()
                };
            }
            Action::SelectTab(tab) => {
                self.tab = tab;
            }
            Action::SetQuery(query) => {
                self.filter.query = query;
                self.filter.page = 1;
            }
            Action::GoToPage(page) => {
                self.filter.page = page.max(1);
            }
            Action::OpenDelivery {
                participant_id,
                participant_name,
            } => {
                self.delivery = Some(DeliveryModal {
                    participant_id,
                    participant_name,
                    form: DeliveryForm::default(),
                });
            }
            Action::SelectFood(food) => {
                if let Some(modal) = self.delivery.as_mut() {
                    modal.form.selected_food = food;
                }
            }
            Action::SetCustomFood(label) => {
                if let Some(modal) = self.delivery.as_mut() {
                    modal.form.custom_food = label;
                }
            }
            Action::SetWeight(kg) => {
                if let Some(modal) = self.delivery.as_mut() {
                    modal.form.weight_kg = kg;
                }
            }
            Action::CloseDelivery => {
                self.delivery = None;
            }
            Action::DeliveryConfirmed(receipt) => {
                self.delivery = None;
                self.notice = Some(Notice::success(format!(
                    "Pulseira entregue para {} ({} de {}).",
                    receipt.participant_name,
                    format_kg(receipt.delivery.food_kg),
                    receipt.delivery.food_type
                )));
                self.last_confirmed = Some(receipt);
            }
            Action::ShowDetail(id) => {
                self.detail = Some(id);
            }
            Action::CloseDetail => {
                self.detail = None;
            }
            Action::RequestDelete(target) => {
                self.pending_delete = Some(target);
            }
            Action::CancelDelete | Action::DeleteCompleted => {
                self.pending_delete = None;
            }
            Action::EditAttraction(attraction) => {
                self.attraction_form.begin_edit(&attraction);
            }
            Action::UpdateAttractionDraft(draft) => {
                self.attraction_form.draft = draft;
            }
            Action::CancelAttractionEdit => {
                self.attraction_form.cancel_edit();
            }
            Action::Notify(notice) => {
                self.notice = Some(notice);
            }
            Action::DismissNotice => {
                self.notice = None;
            }
        }
        self
    }

    /// Pull the page back into range after the collection changed size
    pub fn clamp_page(&mut self, total_pages: usize) {
        self.filter.page = clamp_page(self.filter.page, total_pages);
    }
}
