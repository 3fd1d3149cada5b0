//! Derived attributes and owned sub-objects.
//!
//! Everything here is a function of the current inputs. Sub-objects (top
//! bar, invitation form) are owned by the view: created when their
//! condition starts to hold, dropped when it stops.

use serde::Serialize;
use threadview_core::model::{Device, PartnerId, ThreadSnapshot};

/// Keyboard shortcut sending the composer content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SendShortcut {
    #[serde(rename = "enter")]
    Enter,
    #[serde(rename = "ctrl-enter")]
    CtrlEnter,
    #[serde(rename = "meta-enter")]
    MetaEnter,
}

const MOBILE_SHORTCUTS: &[SendShortcut] = &[SendShortcut::CtrlEnter, SendShortcut::MetaEnter];
const DESKTOP_SHORTCUTS: &[SendShortcut] = &[SendShortcut::Enter];

/// Shortcuts available to send a message from the composer.
///
/// `None` when the thread or device is unknown. Mobile renderers have a send
/// button, so plain enter inserts a new line there.
pub fn input_send_shortcuts(
    thread: Option<&ThreadSnapshot>,
    device: Option<&Device>,
) -> Option<&'static [SendShortcut]> {
    thread?;
    let device = device?;
    if device.is_mobile {
        Some(MOBILE_SHORTCUTS)
    } else {
        Some(DESKTOP_SHORTCUTS)
    }
}

/// Top bar of the view. Its presence is the state; renderers hang their
/// own top bar widgets off it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Topbar;

/// Reconciles the owned top bar with `has_topbar`. Returns true if it was
/// created or dropped.
pub fn reconcile_topbar(topbar: &mut Option<Topbar>, has_topbar: bool) -> bool {
    match (has_topbar, topbar.is_some()) {
        (true, false) => {
            *topbar = Some(Topbar::default());
            true
        }
        (false, true) => {
            *topbar = None;
            true
        }
        _ => false,
    }
}

/// Partner invitation form of a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelInvitationForm {
    pub search_term: Option<String>,
    pub search_result_count: Option<usize>,
    pub selectable_partners: Vec<PartnerId>,
    pub selected_partners: Vec<PartnerId>,
}

impl ChannelInvitationForm {
    /// Forgets the current search and selection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies search results for `term`.
    pub fn set_search(&mut self, term: String, results: Vec<PartnerId>) {
        self.search_result_count = Some(results.len());
        self.search_term = Some(term);
        self.selectable_partners = results;
    }

    /// Toggles selection of `partner`. Returns whether it is now selected.
    pub fn toggle(&mut self, partner: PartnerId) -> bool {
        if let Some(pos) = self.selected_partners.iter().position(|p| *p == partner) {
            self.selected_partners.remove(pos);
            false
        } else {
            self.selected_partners.push(partner);
            true
        }
    }
}

/// Reconciles the owned invitation form with the thread.
///
/// The form exists only for threads with the invite feature. Called when
/// the thread identity or its invite feature changed: an existing form
/// then belongs to another thread and its search state is reset.
/// Returns true if the form changed.
pub fn reconcile_invitation_form(
    form: &mut Option<ChannelInvitationForm>,
    thread: Option<&ThreadSnapshot>,
) -> bool {
    let enabled = thread.is_some_and(|t| t.has_invite_feature);
    match (enabled, form.as_mut()) {
        (false, None) => false,
        (false, Some(_)) => {
            *form = None;
            true
        }
        (true, None) => {
            *form = Some(ChannelInvitationForm::default());
            true
        }
        (true, Some(existing)) => {
            let before = existing.clone();
            existing.reset();
            *existing != before
        }
    }
}
