//! The activity store.
//!
//! [`ActivityStore`] owns the registry, the current selection and the status
//! flags. Every backend operation follows the same shape:
//!
//! 1. raise its status flag (observers see `pending` before any I/O),
//! 2. await the remote call with no lock held,
//! 3. on success, ingest the response and commit it in one write section,
//!    on failure, publish one [`StoreEvent::OperationFailed`],
//! 4. lower the flag. A drop guard does this, so it also
//!    happens when the future is abandoned mid-flight.
//!
//! All state sits behind a single `RwLock` that is never held across an
//! `.await`. Readers therefore see either the state before a commit or the
//! state after it, never a partial batch. Concurrent operations are neither
//! deduplicated nor ordered: the last commit wins per key.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use reactivities_shared::{Activity, ActivityWire, CurrentUser, RemoteError};

use crate::error::StoreError;
use crate::events::{emit_event, Operation, StoreEvent, EVENT_CHANNEL_CAPACITY};
use crate::registry::EntityRegistry;
use crate::remote::RemoteServiceClient;
use crate::views::{self, DateBucket};

// ---------------------------------------------------------------------------
// Observable state
// ---------------------------------------------------------------------------

/// Per-operation progress flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusFlags {
    /// A list or detail load is in flight.
    pub loading_initial: bool,
    /// A create, edit or delete is in flight.
    pub submitting: bool,
    /// An attend or unattend is in flight.
    pub loading: bool,
    /// Id of the activity being deleted.
    pub target: Option<String>,
}

/// Immutable copy of everything an observer may render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub flags: StatusFlags,
    pub selected: Option<Activity>,
    pub edit_mode: bool,
    pub activities_by_date: Vec<DateBucket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    LoadingInitial = 0,
    Submitting = 1,
    Loading = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attendance {
    Join,
    Leave,
}

impl Attendance {
    fn operation(self) -> Operation {
        match self {
            Attendance::Join => Operation::Attend,
            Attendance::Leave => Operation::Unattend,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    registry: EntityRegistry,
    selected: Option<Activity>,
    flags: StatusFlags,
    edit_mode: bool,
    /// Operations in flight per [`Flag`]. A flag is up while its count is
    /// non-zero.
    in_flight: [usize; 3],
}

impl StoreState {
    fn set_flag(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::LoadingInitial => self.flags.loading_initial = value,
            Flag::Submitting => self.flags.submitting = value,
            Flag::Loading => self.flags.loading = value,
        }
    }

    fn raise(&mut self, flag: Flag) {
        self.in_flight[flag as usize] += 1;
        self.set_flag(flag, true);
    }

    fn settle(&mut self, flag: Flag) {
        let count = &mut self.in_flight[flag as usize];
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.set_flag(flag, false);
        }
    }

    /// Commit `activity` to the registry and refresh the selection if it
    /// shows the same entity.
    fn commit_activity(&mut self, activity: Activity) {
        if self.selected.as_ref().is_some_and(|s| s.id == activity.id) {
            self.selected = Some(activity.clone());
        }
        self.registry.set(activity);
    }
}

/// Settles one in-flight operation when dropped.
///
/// The flag goes down once the last operation holding it settles. `target`
/// is cleared only by the guard that set it, and only while it still names
/// the same id.
struct Pending<'a> {
    store: &'a ActivityStore,
    flag: Flag,
    target: Option<String>,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        let flag = self.flag;
        let target = self.target.take();
        self.store.update(|s| {
            s.settle(flag);
            if target.is_some() && s.flags.target == target {
                s.flags.target = None;
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Client-side cache of activities kept in sync with the backend.
///
/// Construct one per session and hand out `Arc<ActivityStore>` clones.
pub struct ActivityStore {
    remote: Arc<dyn RemoteServiceClient>,
    user: CurrentUser,
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl ActivityStore {
    pub fn new(remote: Arc<dyn RemoteServiceClient>, user: CurrentUser) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            remote,
            user,
            state: RwLock::new(StoreState::default()),
            events,
        }
    }

    /// Receive [`StoreEvent`]s from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // -- Reads --------------------------------------------------------------

    pub fn flags(&self) -> StatusFlags {
        self.read(|s| s.flags.clone())
    }

    pub fn selected(&self) -> Option<Activity> {
        self.read(|s| s.selected.clone())
    }

    pub fn edit_mode(&self) -> bool {
        self.read(|s| s.edit_mode)
    }

    /// Cached copy of one activity. Never touches the network.
    pub fn get(&self, id: &str) -> Option<Activity> {
        self.read(|s| s.registry.get(id))
    }

    /// Cached activities grouped by calendar day.
    pub fn activities_by_date(&self) -> Vec<DateBucket> {
        self.read(|s| views::group_by_date(s.registry.values()))
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.read(|s| StoreSnapshot {
            flags: s.flags.clone(),
            selected: s.selected.clone(),
            edit_mode: s.edit_mode,
            activities_by_date: views::group_by_date(s.registry.values()),
        })
    }

    // -- Selection and form state ------------------------------------------

    pub fn clear_selection(&self) {
        self.update(|s| s.selected = None);
    }

    /// Select a cached activity for viewing. Unknown ids clear the selection.
    pub fn select_activity(&self, id: &str) {
        self.update(|s| {
            s.selected = s.registry.get(id);
            s.edit_mode = false;
        });
    }

    pub fn open_create_form(&self) {
        self.update(|s| {
            s.edit_mode = true;
            s.selected = None;
        });
    }

    pub fn open_edit_form(&self, id: &str) {
        self.update(|s| {
            s.selected = s.registry.get(id);
            s.edit_mode = true;
        });
    }

    pub fn cancel_form_open(&self) {
        self.update(|s| s.edit_mode = false);
    }

    // -- Backend operations -------------------------------------------------

    /// Fetch every activity and cache them all in one commit.
    ///
    /// Returns `true` when the commit happened.
    pub async fn load_all(&self) -> bool {
        let _pending = self.begin(Flag::LoadingInitial, None);

        let result = match self.remote.list().await {
            Ok(wires) => wires
                .into_iter()
                .map(|w| self.ingest(w))
                .collect::<Result<Vec<_>, _>>(),
            Err(e) => Err(e),
        };

        match result {
            Ok(activities) => {
                let count = activities.len();
                self.update(|s| {
                    for activity in activities {
                        s.commit_activity(activity);
                    }
                });
                info!(count, "Activities loaded");
                true
            }
            Err(e) => {
                self.report(Operation::LoadAll, e.into());
                false
            }
        }
    }

    /// Return one activity and make it the current selection.
    ///
    /// A cached entry is returned as is, without asking the backend.
    pub async fn load_one(&self, id: &str) -> Option<Activity> {
        if let Some(cached) = self.get(id) {
            debug!(activity_id = %id, "Activity served from cache");
            self.update(|s| s.selected = Some(cached.clone()));
            return Some(cached);
        }

        let _pending = self.begin(Flag::LoadingInitial, None);

        let result = match self.remote.details(id).await {
            Ok(wire) => self.ingest(wire),
            Err(e) => Err(e),
        };

        match result {
            Ok(activity) => {
                self.update(|s| {
                    s.registry.set(activity.clone());
                    s.selected = Some(activity.clone());
                });
                debug!(activity_id = %activity.id, "Activity fetched");
                Some(activity)
            }
            Err(e) => {
                self.report(Operation::LoadOne, e.into());
                None
            }
        }
    }

    /// Create `activity` remotely and cache it with the current user as host.
    ///
    /// The caller assigns the id (see [`reactivities_shared::ActivityDraft`]).
    pub async fn create(&self, activity: Activity) -> bool {
        let _pending = self.begin(Flag::Submitting, None);

        if let Err(e) = self.remote.create(&ActivityWire::from(&activity)).await {
            self.report(Operation::Create, e.into());
            return false;
        }

        let mut activity = activity;
        activity.remove_attendee(&self.user.username);
        activity.add_attendee(self.user.as_attendee(true));
        activity.apply_user(&self.user);

        info!(activity_id = %activity.id, title = %activity.title, "Activity created");
        self.update(|s| {
            s.registry.set(activity);
            s.edit_mode = false;
        });
        true
    }

    /// Send an update and overwrite the cached entry.
    pub async fn edit(&self, activity: Activity) -> bool {
        let _pending = self.begin(Flag::Submitting, None);

        if let Err(e) = self.remote.update(&ActivityWire::from(&activity)).await {
            self.report(Operation::Edit, e.into());
            return false;
        }

        let mut activity = activity;
        activity.apply_user(&self.user);

        info!(activity_id = %activity.id, "Activity updated");
        self.update(|s| {
            s.commit_activity(activity);
            s.edit_mode = false;
        });
        true
    }

    /// Delete remotely, then drop the cached entry.
    ///
    /// Deleting an id that is not cached only affects the backend.
    pub async fn delete(&self, id: &str) -> bool {
        let _pending = self.begin(Flag::Submitting, Some(id.to_string()));

        if let Err(e) = self.remote.delete(id).await {
            self.report(Operation::Delete, e.into());
            return false;
        }

        info!(activity_id = %id, "Activity deleted");
        self.update(|s| s.registry.delete(id));
        true
    }

    /// Join the selected activity as the current user.
    pub async fn attend(&self) -> bool {
        self.change_attendance(Attendance::Join).await
    }

    /// Leave the selected activity.
    pub async fn unattend(&self) -> bool {
        self.change_attendance(Attendance::Leave).await
    }

    async fn change_attendance(&self, attendance: Attendance) -> bool {
        let operation = attendance.operation();
        let Some(mut current) = self.selected() else {
            self.report(operation, StoreError::NoSelection);
            return false;
        };

        let _pending = self.begin(Flag::Loading, None);

        let result = match attendance {
            Attendance::Join => self.remote.attend(&current.id).await,
            Attendance::Leave => self.remote.unattend(&current.id).await,
        };
        if let Err(e) = result {
            self.report(operation, e.into());
            return false;
        }

        match attendance {
            Attendance::Join => current.add_attendee(self.user.as_attendee(false)),
            Attendance::Leave => current.remove_attendee(&self.user.username),
        }
        current.apply_user(&self.user);

        info!(
            activity_id = %current.id,
            going = current.is_going,
            "Attendance changed"
        );
        self.update(|s| s.commit_activity(current));
        true
    }

    // -- Internals ----------------------------------------------------------

    fn ingest(&self, wire: ActivityWire) -> Result<Activity, RemoteError> {
        Ok(wire.into_activity(&self.user)?)
    }

    fn begin(&self, flag: Flag, target: Option<String>) -> Pending<'_> {
        self.update(|s| {
            s.raise(flag);
            if target.is_some() {
                s.flags.target = target.clone();
            }
        });
        Pending {
            store: self,
            flag,
            target,
        }
    }

    fn report(&self, operation: Operation, error: StoreError) {
        warn!(%operation, error = %error, "Store operation failed");
        emit_event(
            &self.events,
            StoreEvent::OperationFailed {
                operation,
                message: error.to_string(),
            },
        );
    }

    fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Apply one atomic change and notify subscribers.
    fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let result = {
            let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        };
        emit_event(&self.events, StoreEvent::Changed);
        result
    }
}
