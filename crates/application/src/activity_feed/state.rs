use pulseboard_domain::{ActivityAction, ActivityEntry, ResourceType};

/// User-visible failure of the last feed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFailure {
    /// Loading a page failed; a retry control is offered.
    LoadFailed,
    /// Clearing the activity log failed; the list is unchanged.
    ClearFailed,
}

impl FeedFailure {
    /// Returns the inline message shown to the user.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::LoadFailed => "Failed to load activities",
            Self::ClearFailed => "Failed to clear activities",
        }
    }

    /// Returns whether a retry control accompanies the message.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LoadFailed)
    }
}

/// Pagination control shown below the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFooter {
    /// More entries exist on the backend.
    LoadMore {
        /// Entries not yet displayed.
        remaining: usize,
    },
    /// Every entry is displayed.
    AllLoaded {
        /// Number of displayed entries.
        count: usize,
    },
    /// Nothing to show.
    Empty,
}

/// Immutable copy of feed state used for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    /// Displayed entries in backend order.
    pub entries: Vec<ActivityEntry>,
    /// Running total used for pagination.
    pub total: usize,
    /// Current page cursor, starting at one.
    pub page: usize,
    /// Initial or replacing load in flight.
    pub loading: bool,
    /// Appending load in flight.
    pub loading_more: bool,
    /// Failure of the last operation.
    pub failure: Option<FeedFailure>,
    /// Clear-all confirmation is armed.
    pub clear_armed: bool,
    /// Clear-all request in flight.
    pub clearing: bool,
    /// Active client action filter.
    pub action_filter: Option<ActivityAction>,
    /// Active UI resource type filter.
    pub resource_type_filter: Option<ResourceType>,
}

impl FeedSnapshot {
    /// Number of entries not yet displayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.entries.len())
    }

    /// Whether the load-more control is enabled.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.entries.len() < self.total
    }

    /// Pagination control for the current state.
    #[must_use]
    pub fn footer(&self) -> FeedFooter {
        if self.has_more() {
            FeedFooter::LoadMore {
                remaining: self.remaining(),
            }
        } else if self.entries.is_empty() {
            FeedFooter::Empty
        } else {
            FeedFooter::AllLoaded {
                count: self.entries.len(),
            }
        }
    }
}

#[derive(Debug)]
pub(super) struct FeedState {
    pub(super) entries: Vec<ActivityEntry>,
    pub(super) total: usize,
    pub(super) page: usize,
    pub(super) loads_in_flight: usize,
    pub(super) appends_in_flight: usize,
    pub(super) failure: Option<FeedFailure>,
    pub(super) clear_armed: bool,
    pub(super) clearing: bool,
    pub(super) action_filter: Option<ActivityAction>,
    pub(super) resource_type_filter: Option<ResourceType>,
    pub(super) generation: u64,
    pub(super) mounted: bool,
    pub(super) last_failed_load: Option<(usize, bool)>,
}

impl FeedState {
    pub(super) fn new() -> Self {
        Self {
            entries: Vec::new(),
            total: 0,
            page: 1,
            loads_in_flight: 0,
            appends_in_flight: 0,
            failure: None,
            clear_armed: false,
            clearing: false,
            action_filter: None,
            resource_type_filter: None,
            generation: 0,
            mounted: false,
            last_failed_load: None,
        }
    }

    /// Drops loaded data and invalidates in-flight responses.
    pub(super) fn reset_for_new_filters(&mut self) {
        self.entries.clear();
        self.total = 0;
        self.page = 1;
        self.failure = None;
        self.last_failed_load = None;
        self.invalidate_in_flight();
    }

    /// Orphans every outstanding request; their responses will be discarded.
    pub(super) fn invalidate_in_flight(&mut self) {
        self.loads_in_flight = 0;
        self.appends_in_flight = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    pub(super) fn begin_load(&mut self, append: bool) {
        let counter = self.in_flight_counter(append);
        *counter = counter.saturating_add(1);
    }

    /// Only called for responses of the current generation.
    pub(super) fn finish_load(&mut self, append: bool) {
        let counter = self.in_flight_counter(append);
        *counter = counter.saturating_sub(1);
    }

    pub(super) fn is_loading(&self) -> bool {
        self.loads_in_flight > 0 || self.appends_in_flight > 0
    }

    fn in_flight_counter(&mut self, append: bool) -> &mut usize {
        if append {
            &mut self.appends_in_flight
        } else {
            &mut self.loads_in_flight
        }
    }

    pub(super) fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            entries: self.entries.clone(),
            total: self.total,
            page: self.page,
            loading: self.loads_in_flight > 0,
            loading_more: self.appends_in_flight > 0,
            failure: self.failure,
            clear_armed: self.clear_armed,
            clearing: self.clearing,
            action_filter: self.action_filter,
            resource_type_filter: self.resource_type_filter,
        }
    }
}
