use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Recall,
    SignIn,
    SignUp,
    SignOut,
    Watchlist,
    WatchlistEdit,
    Catalog,
    Details,
    Rate,
}

impl TaskKind {
    /// Only the newest run matters: starting another cancels the previous
    /// one and late results from it are dropped.
    pub fn is_latest_only(self) -> bool {
        matches!(
            self,
            TaskKind::Watchlist | TaskKind::Catalog | TaskKind::Details
        )
    }
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
    pub cancel: Option<CancellationToken>,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn on_started(&mut self, started: &TaskStarted) {
        if let Some(previous) = self.cancel.take() {
            previous.cancel();
        }
        self.active = Some(started.id);
        self.cancel = started.cancel.clone();
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub recall: TaskState,
    pub sign_in: TaskState,
    pub sign_up: TaskState,
    pub sign_out: TaskState,
    pub watchlist: TaskState,
    pub watchlist_edit: TaskState,
    pub catalog: TaskState,
    pub details: TaskState,
    pub rate: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::Recall => &self.recall,
            TaskKind::SignIn => &self.sign_in,
            TaskKind::SignUp => &self.sign_up,
            TaskKind::SignOut => &self.sign_out,
            TaskKind::Watchlist => &self.watchlist,
            TaskKind::WatchlistEdit => &self.watchlist_edit,
            TaskKind::Catalog => &self.catalog,
            TaskKind::Details => &self.details,
            TaskKind::Rate => &self.rate,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::Recall => &mut self.recall,
            TaskKind::SignIn => &mut self.sign_in,
            TaskKind::SignUp => &mut self.sign_up,
            TaskKind::SignOut => &mut self.sign_out,
            TaskKind::Watchlist => &mut self.watchlist,
            TaskKind::WatchlistEdit => &mut self.watchlist_edit,
            TaskKind::Catalog => &mut self.catalog,
            TaskKind::Details => &mut self.details,
            TaskKind::Rate => &mut self.rate,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.recall.is_running()
            || self.sign_in.is_running()
            || self.sign_up.is_running()
            || self.sign_out.is_running()
            || self.watchlist.is_running()
            || self.watchlist_edit.is_running()
            || self.catalog.is_running()
            || self.details.is_running()
            || self.rate.is_running()
    }

    /// True while any sign-in path (silent or manual) is in flight.
    pub fn is_authenticating(&self) -> bool {
        self.recall.is_running() || self.sign_in.is_running() || self.sign_up.is_running()
    }
}
