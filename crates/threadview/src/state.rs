//! Thread view state.
//!
//! `ThreadView` holds the inputs of one view, the state of each slice and
//! the derived attributes the renderer reads. The reducer (`update`) is the
//! only writer; the renderer gets read-only accessors.
//!
//! ## Dependency Graph
//!
//! ```text
//! SourceCache ──► OnSourceCacheChanged ──► LastVisibleMessage ─┐
//!      │  └─────► OnCacheLoadingChanged ◄── CacheLoading        │
//!      ├────────► InitialScrollHeight/Position ◄── ScrollMemory │
//!      ├────────► Messages/NonEmptyMessages ◄── CacheMessages   │
//! Thread ──► LastMessage, LastNonTransientMessage ─────────────►├─► MarkSeen
//!    └─────► InputSendShortcuts ◄── Device         ComposerFocus┘
//! ThreadIdentity ──► ChannelInvitationForm
//! ViewerTopbar ──► HasTopbar ──► Topbar
//! ```

use std::sync::Arc;

use threadview_core::config::ViewConfig;
use threadview_core::hint::Hint;
use threadview_core::model::{CacheId, CacheSnapshot, Device, MessageId, ThreadSnapshot, ViewId};
use tokio_util::sync::CancellationToken;

use crate::common::TimerSeq;
use crate::features::derived::{ChannelInvitationForm, SendShortcut, Topbar};
use crate::features::hints::HintQueue;
use crate::features::loading::LoadingDebouncer;
use crate::features::scroll::{ScrollMemory, ScrollOffset};
use crate::graph::{GraphError, NodeSpec, Schedule};

/// Nodes of the view's dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // Sources
    SourceCache,
    CacheLoading,
    CacheMessages,
    Thread,
    /// Thread id and invite feature, without the message pointers.
    ThreadIdentity,
    Device,
    ComposerFocus,
    ViewerTopbar,
    ScrollMemory,
    LastVisibleMessage,
    // Reactions on the cache, declared first so they settle before the
    // derived fields reading the new cache.
    OnSourceCacheChanged,
    OnCacheLoadingChanged,
    // Derived
    LastMessage,
    LastNonTransientMessage,
    HasTopbar,
    Topbar,
    ChannelInvitationForm,
    InputSendShortcuts,
    InitialScrollHeight,
    InitialScrollPosition,
    Messages,
    NonEmptyMessages,
    // Read receipt
    MarkSeen,
}

/// Node declarations, in tie-break order.
pub const VIEW_NODES: &[NodeSpec<Field>] = &[
    NodeSpec::source(Field::SourceCache),
    NodeSpec::source(Field::CacheLoading),
    NodeSpec::source(Field::CacheMessages),
    NodeSpec::source(Field::Thread),
    NodeSpec::source(Field::ThreadIdentity),
    NodeSpec::source(Field::Device),
    NodeSpec::source(Field::ComposerFocus),
    NodeSpec::source(Field::ViewerTopbar),
    NodeSpec::source(Field::ScrollMemory),
    NodeSpec::source(Field::LastVisibleMessage),
    NodeSpec::reaction(
        Field::OnSourceCacheChanged,
        &[Field::SourceCache],
        &[Field::LastVisibleMessage],
    ),
    NodeSpec::reaction(
        Field::OnCacheLoadingChanged,
        &[Field::SourceCache, Field::CacheLoading],
        &[],
    ),
    NodeSpec::derived(Field::LastMessage, &[Field::Thread]),
    NodeSpec::derived(Field::LastNonTransientMessage, &[Field::Thread]),
    NodeSpec::derived(Field::HasTopbar, &[Field::ViewerTopbar]),
    NodeSpec::derived(Field::Topbar, &[Field::HasTopbar]),
    NodeSpec::derived(Field::ChannelInvitationForm, &[Field::ThreadIdentity]),
    NodeSpec::derived(Field::InputSendShortcuts, &[Field::Thread, Field::Device]),
    NodeSpec::derived(
        Field::InitialScrollHeight,
        &[Field::SourceCache, Field::ScrollMemory],
    ),
    NodeSpec::derived(
        Field::InitialScrollPosition,
        &[Field::SourceCache, Field::ScrollMemory],
    ),
    NodeSpec::derived(Field::Messages, &[Field::SourceCache, Field::CacheMessages]),
    NodeSpec::derived(
        Field::NonEmptyMessages,
        &[Field::SourceCache, Field::CacheMessages],
    ),
    NodeSpec::reaction(
        Field::MarkSeen,
        &[
            Field::ComposerFocus,
            Field::LastMessage,
            Field::LastNonTransientMessage,
            Field::LastVisibleMessage,
            Field::SourceCache,
        ],
        &[],
    ),
];

/// Cached values of derived fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Derived {
    pub has_topbar: bool,
    pub last_message: Option<MessageId>,
    pub last_non_transient_message: Option<MessageId>,
    pub input_send_shortcuts: Option<&'static [SendShortcut]>,
    pub initial_scroll_height: Option<ScrollOffset>,
    pub initial_scroll_position: Option<ScrollOffset>,
    pub messages: Vec<MessageId>,
    pub non_empty_messages: Vec<MessageId>,
}

/// State of one thread view.
pub struct ThreadView {
    pub(crate) id: ViewId,
    pub(crate) config: ViewConfig,
    pub(crate) schedule: Arc<Schedule<Field>>,
    /// Cancelled when the view is destroyed. Parent of every timer token.
    pub(crate) lifetime: CancellationToken,
    pub(crate) destroyed: bool,

    // Inputs
    pub(crate) source_cache: Option<CacheSnapshot>,
    pub(crate) thread: Option<ThreadSnapshot>,
    pub(crate) device: Option<Device>,
    pub(crate) composer_has_focus: bool,
    pub(crate) viewer_has_topbar: bool,
    pub(crate) last_visible_message: Option<MessageId>,
    pub(crate) scroll: ScrollMemory,
    pub(crate) auto_scroll_on_message_received: bool,

    // Slices
    pub(crate) hints: HintQueue,
    pub(crate) loading: LoadingDebouncer,
    pub(crate) timers: TimerSeq,

    // Derived
    pub(crate) derived: Derived,
    pub(crate) topbar: Option<Topbar>,
    pub(crate) invitation_form: Option<ChannelInvitationForm>,
}

impl ThreadView {
    /// Creates a view with no inputs yet.
    ///
    /// `scroll` is the owner's scroll memory, carried over from previous views.
    pub fn new(config: ViewConfig, scroll: ScrollMemory) -> Result<Self, GraphError> {
        let schedule = Schedule::build(VIEW_NODES)?;
        Ok(Self {
            id: ViewId::new(),
            auto_scroll_on_message_received: config.auto_scroll_on_message_received,
            config,
            schedule: Arc::new(schedule),
            lifetime: CancellationToken::new(),
            destroyed: false,
            source_cache: None,
            thread: None,
            device: None,
            composer_has_focus: false,
            viewer_has_topbar: false,
            last_visible_message: None,
            scroll,
            hints: HintQueue::new(),
            loading: LoadingDebouncer::new(),
            timers: TimerSeq::default(),
            derived: Derived::default(),
            topbar: None,
            invitation_form: None,
        })
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Token cancelled when the view is destroyed.
    pub fn lifetime(&self) -> &CancellationToken {
        &self.lifetime
    }

    pub fn source_cache(&self) -> Option<&CacheSnapshot> {
        self.source_cache.as_ref()
    }

    pub fn source_cache_id(&self) -> Option<&CacheId> {
        self.source_cache.as_ref().map(|cache| &cache.id)
    }

    pub fn thread(&self) -> Option<&ThreadSnapshot> {
        self.thread.as_ref()
    }

    pub fn composer_has_focus(&self) -> bool {
        self.composer_has_focus
    }

    pub fn last_visible_message(&self) -> Option<MessageId> {
        self.last_visible_message
    }

    pub fn last_message(&self) -> Option<MessageId> {
        self.derived.last_message
    }

    pub fn last_non_transient_message(&self) -> Option<MessageId> {
        self.derived.last_non_transient_message
    }

    pub fn hints(&self) -> &[Hint] {
        self.hints.as_slice()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn is_preparing_loading(&self) -> bool {
        self.loading.is_preparing_loading()
    }

    pub fn loading(&self) -> &LoadingDebouncer {
        &self.loading
    }

    pub fn has_topbar(&self) -> bool {
        self.derived.has_topbar
    }

    pub fn topbar(&self) -> Option<&Topbar> {
        self.topbar.as_ref()
    }

    pub fn channel_invitation_form(&self) -> Option<&ChannelInvitationForm> {
        self.invitation_form.as_ref()
    }

    pub fn channel_invitation_form_active(&self) -> bool {
        self.invitation_form.is_some()
    }

    /// Shortcuts sending the composer content; `None` without thread or device.
    pub fn input_send_shortcuts(&self) -> Option<&'static [SendShortcut]> {
        self.derived.input_send_shortcuts
    }

    pub fn thread_cache_initial_scroll_height(&self) -> Option<ScrollOffset> {
        self.derived.initial_scroll_height
    }

    pub fn thread_cache_initial_scroll_position(&self) -> Option<ScrollOffset> {
        self.derived.initial_scroll_position
    }

    pub fn messages(&self) -> &[MessageId] {
        &self.derived.messages
    }

    pub fn non_empty_messages(&self) -> &[MessageId] {
        &self.derived.non_empty_messages
    }

    pub fn has_auto_scroll_on_message_received(&self) -> bool {
        self.auto_scroll_on_message_received
    }

    pub fn scroll_memory(&self) -> &ScrollMemory {
        &self.scroll
    }
}
