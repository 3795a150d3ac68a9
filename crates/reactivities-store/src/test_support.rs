//! In-memory backend for store tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::oneshot;

use reactivities_shared::{Activity, ActivityWire, CurrentUser, RemoteError};

use crate::remote::RemoteServiceClient;

pub(crate) fn wire(id: &str, date: &str) -> ActivityWire {
    ActivityWire {
        id: id.to_string(),
        title: format!("Activity {id}"),
        category: "culture".to_string(),
        description: String::new(),
        date: date.to_string(),
        city: "Paris".to_string(),
        venue: "Louvre".to_string(),
        attendees: Vec::new(),
    }
}

pub(crate) fn activity(id: &str, date: &str) -> Activity {
    wire(id, date)
        .into_activity(&CurrentUser::new("tester", "Tester"))
        .expect("valid fixture")
}

struct HeldList {
    gate: oneshot::Receiver<()>,
    response: Option<Vec<ActivityWire>>,
}

#[derive(Default)]
struct FakeState {
    activities: IndexMap<String, ActivityWire>,
    calls: HashMap<&'static str, usize>,
    failing: HashSet<&'static str>,
    held_lists: VecDeque<HeldList>,
    held_deletes: VecDeque<oneshot::Receiver<()>>,
}

/// Records calls per method name and fails the ones marked with
/// [`FakeRemote::fail`].
#[derive(Default)]
pub(crate) struct FakeRemote {
    state: Mutex<FakeState>,
}

impl FakeRemote {
    pub(crate) fn with(activities: impl IntoIterator<Item = ActivityWire>) -> Self {
        let remote = Self::default();
        for activity in activities {
            remote.replace(activity);
        }
        remote
    }

    pub(crate) fn replace(&self, activity: ActivityWire) {
        let mut state = self.state.lock().unwrap();
        state.activities.insert(activity.id.clone(), activity);
    }

    pub(crate) fn stored(&self) -> Vec<ActivityWire> {
        self.state.lock().unwrap().activities.values().cloned().collect()
    }

    pub(crate) fn fail(&self, method: &'static str) {
        self.state.lock().unwrap().failing.insert(method);
    }

    pub(crate) fn calls(&self, method: &str) -> usize {
        self.state.lock().unwrap().calls.get(method).copied().unwrap_or(0)
    }

    /// The next `list` call answers only after `gate` fires.
    pub(crate) fn hold_next_list(&self, gate: oneshot::Receiver<()>) {
        self.state.lock().unwrap().held_lists.push_back(HeldList {
            gate,
            response: None,
        });
    }

    /// Like [`Self::hold_next_list`], answering with `response`.
    pub(crate) fn hold_next_list_with(
        &self,
        gate: oneshot::Receiver<()>,
        response: Vec<ActivityWire>,
    ) {
        self.state.lock().unwrap().held_lists.push_back(HeldList {
            gate,
            response: Some(response),
        });
    }

    pub(crate) fn hold_next_delete(&self, gate: oneshot::Receiver<()>) {
        self.state.lock().unwrap().held_deletes.push_back(gate);
    }

    /// Count the call and tell whether it should fail.
    fn enter(&self, method: &'static str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(method).or_default() += 1;
        if state.failing.contains(method) {
            return Err(RemoteError::Transport(format!("{method}: connection refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteServiceClient for FakeRemote {
    async fn list(&self) -> Result<Vec<ActivityWire>, RemoteError> {
        self.enter("list")?;
        let (held, current) = {
            let mut state = self.state.lock().unwrap();
            let current: Vec<_> = state.activities.values().cloned().collect();
            (state.held_lists.pop_front(), current)
        };

        match held {
            Some(held) => {
                let _ = held.gate.await;
                Ok(held.response.unwrap_or(current))
            }
            None => Ok(current),
        }
    }

    async fn details(&self, id: &str) -> Result<ActivityWire, RemoteError> {
        self.enter("details")?;
        self.state
            .lock()
            .unwrap()
            .activities
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::Rejected {
                status: 404,
                message: "Not found".to_string(),
            })
    }

    async fn create(&self, activity: &ActivityWire) -> Result<(), RemoteError> {
        self.enter("create")?;
        self.replace(activity.clone());
        Ok(())
    }

    async fn update(&self, activity: &ActivityWire) -> Result<(), RemoteError> {
        self.enter("update")?;
        self.replace(activity.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.enter("delete")?;
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.activities.shift_remove(id);
            state.held_deletes.pop_front()
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(())
    }

    async fn attend(&self, _id: &str) -> Result<(), RemoteError> {
        self.enter("attend")
    }

    async fn unattend(&self, _id: &str) -> Result<(), RemoteError> {
        self.enter("unattend")
    }
}
