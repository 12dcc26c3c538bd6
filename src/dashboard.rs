//! Coordinates the dashboard's data sources.
//!
//! Every backend call runs on the blocking pool and reports back over a
//! channel as a [`DashboardUpdate`]. Updates are applied in arrival order, each
//! to its own view only, and always replace what that view showed before.
//! Updates carry the session generation they were issued under; anything
//! issued for a previous repository is dropped on arrival.

use crate::api::{
    Backend, BranchSet, CommandOutput, CommitGraphEntry, CommitRecord, QueryResult, StatusReport,
    TreeNode,
};
use crate::config::{Config, RemoteConfig, RemoteMode};
use crate::git::command::{pull_args, push_args};
use crate::model::{compute_diff, DiffOutcome, RepositorySession};
use crate::views::diff::DiffRequest;
use crate::views::{
    DiffModal, GraphModal, HistoryView, PanelState, RemoteForm, RemoteOperation, Transcript,
    TreeView, WorkingTreeView,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// A request that changes repository state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Stage(String),
    Unstage(String),
    StageAll,
    Commit(String),
    AssistedCommit,
    CreateBranch(String),
    SwitchBranch(String),
    Push {
        remote: String,
        branch: Option<String>,
    },
    Pull {
        remote: String,
        branch: String,
    },
    RunCommand(String),
}

impl Mutation {
    /// Push leaves the local repository untouched; everything else converges
    /// the dashboard afterwards.
    pub fn requires_refresh(&self) -> bool {
        !matches!(self, Mutation::Push { .. })
    }

    /// Command line echoed to the transcript before the request is sent.
    ///
    /// `None` for mutations that only reach the transcript when they fail.
    pub fn transcript_header(&self) -> Option<String> {
        match self {
            Mutation::RunCommand(command) => Some(command.clone()),
            Mutation::Commit(message) => Some(format!("git commit -m \"{}\"", message)),
            Mutation::AssistedCommit => Some("Assisted commit...".to_string()),
            Mutation::Push { remote, branch } => {
                Some(format!("git {}", push_args(remote, branch.as_deref()).join(" ")))
            }
            Mutation::Pull { remote, branch } => {
                Some(format!("git {}", pull_args(remote, branch).join(" ")))
            }
            _ => None,
        }
    }

    /// Short description used in logs and failure lines.
    pub fn describe(&self) -> String {
        match self {
            Mutation::Stage(file) => format!("git add {}", file),
            Mutation::Unstage(file) => format!("git reset HEAD {}", file),
            Mutation::StageAll => "git add .".to_string(),
            Mutation::CreateBranch(name) => format!("git checkout -b {}", name),
            Mutation::SwitchBranch(name) => format!("git checkout {}", name),
            other => other.transcript_header().unwrap_or_default(),
        }
    }

    pub fn execute(&self, backend: &dyn Backend) -> QueryResult<CommandOutput> {
        match self {
            Mutation::Stage(file) => backend.stage_file(file),
            Mutation::Unstage(file) => backend.unstage_file(file),
            Mutation::StageAll => backend.stage_all(),
            Mutation::Commit(message) => backend.commit(message),
            Mutation::AssistedCommit => backend.assisted_commit(),
            Mutation::CreateBranch(name) => backend.create_branch(name),
            Mutation::SwitchBranch(name) => backend.switch_branch(name),
            Mutation::Push { remote, branch } => backend.push(remote, branch.as_deref()),
            Mutation::Pull { remote, branch } => backend.pull(remote, branch),
            Mutation::RunCommand(command) => backend.run_command(command),
        }
    }
}

/// Result of one backend call, tagged with the session generation it was
/// issued under.
#[derive(Debug)]
pub enum DashboardUpdate {
    Selected(QueryResult<PathBuf>),
    Restored(Option<PathBuf>),
    Recent(Vec<PathBuf>),
    Status(u64, QueryResult<StatusReport>),
    History(u64, QueryResult<Vec<CommitRecord>>),
    Branches(u64, QueryResult<BranchSet>),
    Tree(u64, QueryResult<TreeNode>),
    Mutated(u64, Mutation, QueryResult<CommandOutput>),
    DiffBranches(u64, QueryResult<BranchSet>),
    Diff(u64, u64, DiffOutcome),
    Graph(u64, u64, QueryResult<Vec<CommitGraphEntry>>),
    Remotes(u64, RemoteOperation, Vec<String>),
}

impl DashboardUpdate {
    fn generation(&self) -> Option<u64> {
        match self {
            DashboardUpdate::Selected(_)
            | DashboardUpdate::Restored(_)
            | DashboardUpdate::Recent(_) => None,
            DashboardUpdate::Status(generation, _)
            | DashboardUpdate::History(generation, _)
            | DashboardUpdate::Branches(generation, _)
            | DashboardUpdate::Tree(generation, _)
            | DashboardUpdate::Mutated(generation, _, _)
            | DashboardUpdate::DiffBranches(generation, _)
            | DashboardUpdate::Diff(generation, _, _)
            | DashboardUpdate::Graph(generation, _, _)
            | DashboardUpdate::Remotes(generation, _, _) => Some(*generation),
        }
    }
}

/// Settings the orchestrator needs from the configuration.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub primary_branch: String,
    pub show_lane_labels: bool,
    pub remote: RemoteConfig,
}

impl DashboardOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            primary_branch: config.settings.primary_branch.clone(),
            show_lane_labels: config.settings.show_lane_labels,
            remote: config.remote.clone(),
        }
    }
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct Dashboard {
    backend: Arc<dyn Backend>,
    options: DashboardOptions,
    session: RepositorySession,
    sender: mpsc::UnboundedSender<DashboardUpdate>,
    receiver: mpsc::UnboundedReceiver<DashboardUpdate>,
    in_flight: usize,

    working_tree: WorkingTreeView,
    history: HistoryView,
    branches: PanelState<BranchSet>,
    tree: TreeView,
    /// The tree is only fetched once its panel has been opened.
    tree_opened: bool,
    transcript: Transcript,
    diff: DiffModal,
    graph: GraphModal,
    remote_form: Option<RemoteForm>,
    recent: Vec<PathBuf>,
    notices: VecDeque<String>,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn Backend>, options: DashboardOptions) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let show_lane_labels = options.show_lane_labels;
        Self {
            backend,
            options,
            session: RepositorySession::new(),
            sender,
            receiver,
            in_flight: 0,
            working_tree: WorkingTreeView::new(),
            history: HistoryView::new(),
            branches: PanelState::Loading,
            tree: TreeView::new(),
            tree_opened: false,
            transcript: Transcript::new(),
            diff: DiffModal::new(),
            graph: GraphModal::new(show_lane_labels),
            remote_form: None,
            recent: Vec::new(),
            notices: VecDeque::new(),
        }
    }

    pub fn session(&self) -> &RepositorySession {
        &self.session
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    pub fn working_tree(&self) -> &WorkingTreeView {
        &self.working_tree
    }

    pub fn working_tree_mut(&mut self) -> &mut WorkingTreeView {
        &mut self.working_tree
    }

    pub fn history(&self) -> &HistoryView {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryView {
        &mut self.history
    }

    pub fn branches(&self) -> &PanelState<BranchSet> {
        &self.branches
    }

    pub fn tree(&self) -> &TreeView {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut TreeView {
        &mut self.tree
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn diff(&self) -> &DiffModal {
        &self.diff
    }

    pub fn diff_mut(&mut self) -> &mut DiffModal {
        &mut self.diff
    }

    pub fn graph(&self) -> &GraphModal {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut GraphModal {
        &mut self.graph
    }

    pub fn remote_form(&self) -> Option<&RemoteForm> {
        self.remote_form.as_ref()
    }

    pub fn remote_form_mut(&mut self) -> Option<&mut RemoteForm> {
        self.remote_form.as_mut()
    }

    /// Recently selected repositories as last reported, most recent first.
    pub fn recent(&self) -> &[PathBuf] {
        &self.recent
    }

    /// Checked-out branch, if known.
    pub fn current_branch(&self) -> Option<&str> {
        self.branches.ready().and_then(|set| set.current.as_deref())
    }

    /// Queue a blocking notice for the UI.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notices.push_back(message.into());
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notices.pop_front()
    }

    /// Number of requests whose result has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn spawn<T, Q, W>(&mut self, query: Q, wrap: W)
    where
        T: Send + 'static,
        Q: FnOnce(&dyn Backend) -> T + Send + 'static,
        W: FnOnce(T) -> DashboardUpdate + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let sender = self.sender.clone();
        self.in_flight += 1;
        tokio::task::spawn_blocking(move || {
            let update = wrap(query(backend.as_ref()));
            if sender.send(update).is_err() {
                debug!("dashboard dropped before update arrived");
            }
        });
    }

    /// Ask the backend to make `path` the active repository.
    pub fn select_repository(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        info!(path = %path.display(), "selecting repository");
        self.spawn(
            move |backend| backend.set_repository(&path),
            DashboardUpdate::Selected,
        );
    }

    /// Adopt the repository the backend remembers, if any.
    pub fn restore(&mut self) {
        self.spawn(
            |backend| backend.current_repository(),
            DashboardUpdate::Restored,
        );
        self.load_recent();
    }

    fn load_recent(&mut self) {
        self.spawn(
            |backend| backend.recent_repositories(),
            DashboardUpdate::Recent,
        );
    }

    /// Re-query status, history and branches (and the tree once opened).
    ///
    /// Safe to call repeatedly; the last response to arrive wins per view.
    pub fn refresh(&mut self) {
        if !self.session.is_selected() {
            return;
        }
        let generation = self.session.generation();
        debug!(generation, tree = self.tree_opened, "refresh");

        self.spawn(
            |backend| backend.status(),
            move |result| DashboardUpdate::Status(generation, result),
        );
        self.spawn(
            |backend| backend.history(),
            move |result| DashboardUpdate::History(generation, result),
        );
        self.spawn(
            |backend| backend.branches(),
            move |result| DashboardUpdate::Branches(generation, result),
        );
        if self.tree_opened {
            self.load_tree();
        }
    }

    fn load_tree(&mut self) {
        let generation = self.session.generation();
        self.spawn(
            |backend| backend.tree(),
            move |result| DashboardUpdate::Tree(generation, result),
        );
    }

    /// Mark the tree panel as opened, fetching it the first time.
    pub fn open_tree(&mut self) {
        if self.tree_opened {
            return;
        }
        self.tree_opened = true;
        if self.session.is_selected() {
            self.load_tree();
        }
    }

    /// Send a mutation to the backend.
    ///
    /// Its command line is echoed first; the output is appended to the
    /// transcript on completion, followed by a refresh unless it was a push.
    pub fn dispatch(&mut self, mutation: Mutation) {
        if let Mutation::Commit(message) = &mutation {
            if message.trim().is_empty() {
                self.notify("Please enter a commit message");
                return;
            }
        }

        if let Some(header) = mutation.transcript_header() {
            self.transcript.echo(&header);
        }
        info!(command = %mutation.describe(), "dispatch");

        let generation = self.session.generation();
        let request = mutation.clone();
        self.spawn(
            move |backend| request.execute(backend),
            move |result| DashboardUpdate::Mutated(generation, mutation, result),
        );
    }

    /// Show the diff modal and fetch a fresh branch listing for its selectors.
    pub fn open_diff(&mut self) {
        let generation = self.session.generation();
        self.diff.open(&BranchSet::default(), &self.options.primary_branch);
        self.spawn(
            |backend| backend.branches(),
            move |result| DashboardUpdate::DiffBranches(generation, result),
        );
    }

    /// Fetch the diff for the modal's current selection.
    pub fn request_diff(&mut self) {
        let Some(DiffRequest { id, target, source }) = self.diff.begin_request() else {
            return;
        };
        debug!(%target, %source, id, "diff requested");
        let generation = self.session.generation();
        self.spawn(
            move |backend| compute_diff(backend, &target, &source),
            move |outcome| DashboardUpdate::Diff(generation, id, outcome),
        );
    }

    /// Show the graph modal and fetch the full commit graph.
    pub fn open_graph(&mut self) {
        let id = self.graph.open();
        let generation = self.session.generation();
        self.spawn(
            |backend| backend.commit_graph(),
            move |result| DashboardUpdate::Graph(generation, id, result),
        );
    }

    /// Start a push or pull.
    ///
    /// In fixed mode the configured remote and branch are used directly and
    /// `false` is returned; otherwise the form is prepared once remotes arrive.
    pub fn open_remote_form(&mut self, operation: RemoteOperation) -> bool {
        let remote = &self.options.remote;
        if remote.mode == RemoteMode::Fixed {
            let remote_name = remote.default_remote.clone();
            let branch = remote.default_branch.clone();
            self.dispatch(match operation {
                RemoteOperation::Push => Mutation::Push {
                    remote: remote_name,
                    branch: Some(branch),
                },
                RemoteOperation::Pull => Mutation::Pull {
                    remote: remote_name,
                    branch,
                },
            });
            return false;
        }

        self.remote_form = None;
        let generation = self.session.generation();
        self.spawn(
            |backend| backend.remotes(),
            move |remotes| DashboardUpdate::Remotes(generation, operation, remotes),
        );
        true
    }

    pub fn close_remote_form(&mut self) {
        self.remote_form = None;
    }

    /// Drain every update that has arrived, in arrival order.
    pub fn poll_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.receiver.try_recv() {
            self.apply(update);
            applied += 1;
        }
        applied
    }

    /// Wait for the next update and apply it.
    pub async fn next_update(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(update) => {
                self.apply(update);
                true
            }
            None => false,
        }
    }

    /// Apply updates until nothing is in flight, including follow-up requests.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            if !self.next_update().await {
                break;
            }
        }
    }

    fn invalidate(&mut self) {
        self.working_tree.reset();
        self.history.reset();
        self.branches = PanelState::Loading;
        self.tree.reset();
        self.graph.hide();
        self.diff.reset();
        self.remote_form = None;
    }

    pub fn apply(&mut self, update: DashboardUpdate) {
        self.in_flight = self.in_flight.saturating_sub(1);

        if let Some(generation) = update.generation() {
            if generation != self.session.generation() {
                debug!(generation, current = self.session.generation(), "stale update dropped");
                return;
            }
        }

        match update {
            DashboardUpdate::Selected(result) => match self.session.select(result) {
                Ok(handle) => {
                    info!(repo = %handle, "repository selected");
                    self.invalidate();
                    self.refresh();
                    self.load_recent();
                }
                Err(err) => {
                    warn!(error = %err, "repository selection failed");
                    self.notify(err.to_string());
                }
            },
            DashboardUpdate::Restored(remembered) => {
                if let Some(handle) = self.session.restore(remembered) {
                    info!(repo = %handle, "repository restored");
                    self.invalidate();
                    self.refresh();
                }
            }
            DashboardUpdate::Recent(recent) => self.recent = recent,
            DashboardUpdate::Status(_, result) => self.working_tree.apply_status(result),
            DashboardUpdate::History(_, result) => self.history.apply(result),
            DashboardUpdate::Branches(_, result) => {
                self.branches = PanelState::from_result(result, |set| set.branches.is_empty());
            }
            DashboardUpdate::Tree(_, result) => self.tree.apply(result),
            DashboardUpdate::Mutated(_, mutation, result) => {
                self.finish_mutation(mutation, result)
            }
            DashboardUpdate::DiffBranches(_, result) => match result {
                Ok(branches) => {
                    self.diff.open(&branches, &self.options.primary_branch);
                    self.request_diff();
                }
                Err(err) => self.diff.fail(err),
            },
            DashboardUpdate::Diff(_, id, outcome) => {
                if !self.diff.apply(id, outcome) {
                    debug!(id, "superseded diff dropped");
                }
            }
            DashboardUpdate::Graph(_, id, result) => {
                if !self.graph.apply(id, result) {
                    debug!(id, "superseded graph dropped");
                }
            }
            DashboardUpdate::Remotes(_, operation, remotes) => {
                self.remote_form = Some(RemoteForm::new(
                    operation,
                    &remotes,
                    self.current_branch(),
                ));
            }
        }
    }

    fn finish_mutation(&mut self, mutation: Mutation, result: QueryResult<CommandOutput>) {
        match &result {
            Ok(_) => debug!(command = %mutation.describe(), "mutation finished"),
            Err(err) => warn!(command = %mutation.describe(), error = %err, "mutation failed"),
        }

        if mutation.transcript_header().is_some() {
            self.transcript.record(&result);
        } else if result.is_err() {
            self.transcript.echo(&mutation.describe());
            self.transcript.record(&result);
        }

        if mutation.requires_refresh() {
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DiffRef, FileDiff, FileStatusEntry, QueryError};
    use crate::views::diff::DiffBody;
    use crate::views::{FileRole, GraphState};
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeState {
        repo: Option<PathBuf>,
        status: StatusReport,
        branches: Vec<String>,
        current: Option<String>,
        remotes: Vec<String>,
        calls: Vec<String>,
    }

    /// In-memory backend: staging moves entries between the two lists.
    #[derive(Default)]
    struct FakeBackend {
        state: Mutex<FakeState>,
    }

    impl FakeBackend {
        fn with_files(staged: &[&str], unstaged: &[&str]) -> Self {
            let backend = FakeBackend::default();
            {
                let mut state = backend.state.lock().unwrap();
                state.status.staged = staged.iter().map(|f| FileStatusEntry::new("M ", *f)).collect();
                state.status.unstaged =
                    unstaged.iter().map(|f| FileStatusEntry::new(" M", *f)).collect();
                state.branches = vec!["dev".to_string(), "main".to_string()];
                state.current = Some("dev".to_string());
            }
            backend
        }

        fn record(&self, call: impl Into<String>) {
            self.state.lock().unwrap().calls.push(call.into());
        }

        fn count(&self, call: &str) -> usize {
            self.state.lock().unwrap().calls.iter().filter(|c| *c == call).count()
        }
    }

    impl Backend for FakeBackend {
        fn current_repository(&self) -> Option<PathBuf> {
            self.state.lock().unwrap().repo.clone()
        }

        fn recent_repositories(&self) -> Vec<PathBuf> {
            self.current_repository().into_iter().collect()
        }

        fn set_repository(&self, path: &Path) -> QueryResult<PathBuf> {
            if path.to_string_lossy().contains("missing") {
                return Err(QueryError::InvalidRepository(path.display().to_string()));
            }
            self.state.lock().unwrap().repo = Some(path.to_path_buf());
            Ok(path.to_path_buf())
        }

        fn status(&self) -> QueryResult<StatusReport> {
            self.record("status");
            Ok(self.state.lock().unwrap().status.clone())
        }

        fn history(&self) -> QueryResult<Vec<CommitRecord>> {
            self.record("history");
            Err(QueryError::failed("history unavailable"))
        }

        fn branches(&self) -> QueryResult<BranchSet> {
            self.record("branches");
            let state = self.state.lock().unwrap();
            Ok(BranchSet::new(state.branches.clone(), state.current.clone()))
        }

        fn tree(&self) -> QueryResult<TreeNode> {
            self.record("tree");
            Ok(TreeNode::directory("repo", vec![TreeNode::file("a.txt")]))
        }

        fn remotes(&self) -> Vec<String> {
            self.state.lock().unwrap().remotes.clone()
        }

        fn commit_graph(&self) -> QueryResult<Vec<CommitGraphEntry>> {
            Ok(vec![CommitGraphEntry {
                hash: "abc".to_string(),
                parents: vec![],
                refs: vec!["HEAD -> main".to_string()],
                author: Default::default(),
                subject: "init".to_string(),
            }])
        }

        fn stage_file(&self, file: &str) -> QueryResult<CommandOutput> {
            self.record(format!("stage {}", file));
            let mut state = self.state.lock().unwrap();
            if let Some(pos) = state.status.unstaged.iter().position(|e| e.file == file) {
                let entry = state.status.unstaged.remove(pos);
                state.status.staged.push(FileStatusEntry::new("M ", entry.file));
            }
            Ok(CommandOutput::ack())
        }

        fn unstage_file(&self, file: &str) -> QueryResult<CommandOutput> {
            self.record(format!("unstage {}", file));
            let mut state = self.state.lock().unwrap();
            if let Some(pos) = state.status.staged.iter().position(|e| e.file == file) {
                let entry = state.status.staged.remove(pos);
                state.status.unstaged.push(FileStatusEntry::new(" M", entry.file));
            }
            Ok(CommandOutput::ack())
        }

        fn stage_all(&self) -> QueryResult<CommandOutput> {
            self.record("stage_all");
            Ok(CommandOutput::ack())
        }

        fn run_command(&self, command: &str) -> QueryResult<CommandOutput> {
            self.record(format!("run {}", command));
            Ok(CommandOutput::stdout("ran\n"))
        }

        fn commit(&self, message: &str) -> QueryResult<CommandOutput> {
            self.record(format!("commit {}", message));
            Ok(CommandOutput::stdout(format!("[dev abc1234] {}\n", message)))
        }

        fn assisted_commit(&self) -> QueryResult<CommandOutput> {
            Err(QueryError::failed("No assisted commit command configured"))
        }

        fn create_branch(&self, name: &str) -> QueryResult<CommandOutput> {
            self.record(format!("create {}", name));
            Ok(CommandOutput::ack())
        }

        fn switch_branch(&self, name: &str) -> QueryResult<CommandOutput> {
            self.record(format!("switch {}", name));
            Err(QueryError::failed(format!("Reference not found: {}", name)))
        }

        fn push(&self, remote: &str, branch: Option<&str>) -> QueryResult<CommandOutput> {
            self.record(format!("push {} {}", remote, branch.unwrap_or("HEAD")));
            Ok(CommandOutput {
                stdout: String::new(),
                stderr: "Everything up-to-date\n".to_string(),
            })
        }

        fn pull(&self, remote: &str, branch: &str) -> QueryResult<CommandOutput> {
            self.record(format!("pull {} {}", remote, branch));
            Ok(CommandOutput::stdout("Already up to date.\n"))
        }

        fn diff(&self, target: &DiffRef, source: &DiffRef) -> QueryResult<Vec<FileDiff>> {
            self.record(format!("diff {} {}", target, source));
            if target == source {
                return Ok(vec![]);
            }
            Ok(vec![FileDiff::new("a.txt")])
        }
    }

    fn dashboard(backend: &Arc<FakeBackend>) -> Dashboard {
        let backend: Arc<dyn Backend> = backend.clone();
        Dashboard::new(backend, DashboardOptions::default())
    }

    async fn selected(backend: &Arc<FakeBackend>) -> Dashboard {
        let mut dashboard = dashboard(backend);
        dashboard.select_repository("/work/repo");
        dashboard.settle().await;
        dashboard
    }

    #[tokio::test]
    async fn test_inert_until_selected() {
        let backend = Arc::new(FakeBackend::with_files(&[], &["a.txt"]));
        let mut dashboard = dashboard(&backend);
        dashboard.refresh();
        assert_eq!(dashboard.in_flight(), 0);
        assert!(dashboard.working_tree().list(FileRole::Unstaged).state().is_loading());
    }

    #[tokio::test]
    async fn test_select_fans_out_and_isolates_failures() {
        let backend = Arc::new(FakeBackend::with_files(&["s.txt"], &["a.txt", "b.txt"]));
        let dashboard = selected(&backend).await;

        assert_eq!(dashboard.working_tree().files(FileRole::Staged), vec!["s.txt"]);
        assert_eq!(dashboard.working_tree().files(FileRole::Unstaged).len(), 2);
        assert_eq!(
            dashboard.history().state(),
            &PanelState::Failed("history unavailable".to_string())
        );
        assert_eq!(dashboard.current_branch(), Some("dev"));
        assert_eq!(backend.count("tree"), 0);
    }

    #[tokio::test]
    async fn test_failed_selection_keeps_handle() {
        let backend = Arc::new(FakeBackend::with_files(&[], &[]));
        let mut dashboard = selected(&backend).await;
        let generation = dashboard.session().generation();

        dashboard.select_repository("/work/missing");
        dashboard.settle().await;

        assert_eq!(dashboard.session().generation(), generation);
        assert_eq!(
            dashboard.session().current().map(|h| h.path().to_path_buf()),
            Some(PathBuf::from("/work/repo"))
        );
        assert_eq!(
            dashboard.take_notice(),
            Some("Invalid repo path: /work/missing".to_string())
        );
    }

    #[tokio::test]
    async fn test_restore_adopts_remembered_repository() {
        let backend = Arc::new(FakeBackend::with_files(&[], &["a.txt"]));
        backend.state.lock().unwrap().repo = Some(PathBuf::from("/work/repo"));
        let mut dashboard = dashboard(&backend);

        dashboard.restore();
        dashboard.settle().await;
        assert!(dashboard.session().is_selected());
        assert_eq!(dashboard.recent(), &[PathBuf::from("/work/repo")]);
        assert_eq!(dashboard.working_tree().files(FileRole::Unstaged), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_stage_refreshes_and_moves_file() {
        let backend = Arc::new(FakeBackend::with_files(&[], &["a.txt", "b.txt"]));
        let mut dashboard = selected(&backend).await;

        dashboard.dispatch(Mutation::Stage("a.txt".to_string()));
        dashboard.settle().await;

        assert_eq!(dashboard.working_tree().files(FileRole::Staged), vec!["a.txt"]);
        assert_eq!(dashboard.working_tree().files(FileRole::Unstaged), vec!["b.txt"]);
        assert_eq!(backend.count("status"), 2);
        assert!(dashboard.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_push_does_not_refresh() {
        let backend = Arc::new(FakeBackend::with_files(&[], &[]));
        let mut dashboard = selected(&backend).await;

        dashboard.dispatch(Mutation::Push {
            remote: "origin".to_string(),
            branch: None,
        });
        dashboard.settle().await;

        assert_eq!(backend.count("status"), 1);
        assert_eq!(
            dashboard.transcript().lines(),
            &["> git push origin HEAD", "Everything up-to-date"]
        );
    }

    #[tokio::test]
    async fn test_pull_refreshes() {
        let backend = Arc::new(FakeBackend::with_files(&[], &[]));
        let mut dashboard = selected(&backend).await;

        dashboard.dispatch(Mutation::Pull {
            remote: "origin".to_string(),
            branch: "main".to_string(),
        });
        dashboard.settle().await;

        assert_eq!(backend.count("status"), 2);
        assert_eq!(dashboard.transcript().lines()[0], "> git pull origin main");
    }

    #[tokio::test]
    async fn test_empty_commit_message_rejected_locally() {
        let backend = Arc::new(FakeBackend::with_files(&["a.txt"], &[]));
        let mut dashboard = selected(&backend).await;

        dashboard.dispatch(Mutation::Commit("   ".to_string()));
        assert_eq!(dashboard.in_flight(), 0);
        assert_eq!(
            dashboard.take_notice(),
            Some("Please enter a commit message".to_string())
        );
        assert!(dashboard.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_commit_output_in_transcript() {
        let backend = Arc::new(FakeBackend::with_files(&["a.txt"], &[]));
        let mut dashboard = selected(&backend).await;

        dashboard.dispatch(Mutation::Commit("add a".to_string()));
        dashboard.settle().await;
        assert_eq!(
            dashboard.transcript().lines(),
            &["> git commit -m \"add a\"", "[dev abc1234] add a"]
        );
    }

    #[tokio::test]
    async fn test_silent_mutation_failure_reaches_transcript() {
        let backend = Arc::new(FakeBackend::with_files(&[], &[]));
        let mut dashboard = selected(&backend).await;

        dashboard.dispatch(Mutation::SwitchBranch("gone".to_string()));
        dashboard.settle().await;
        assert_eq!(
            dashboard.transcript().lines(),
            &["> git checkout gone", "error: Reference not found: gone"]
        );
        assert_eq!(backend.count("status"), 2);
    }

    #[tokio::test]
    async fn test_double_refresh_does_not_duplicate() {
        let backend = Arc::new(FakeBackend::with_files(&["s.txt"], &["a.txt", "b.txt"]));
        let mut dashboard = selected(&backend).await;

        dashboard.refresh();
        dashboard.refresh();
        dashboard.settle().await;

        assert_eq!(dashboard.working_tree().files(FileRole::Staged), vec!["s.txt"]);
        assert_eq!(dashboard.working_tree().files(FileRole::Unstaged), vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_stale_generation_dropped() {
        let backend = Arc::new(FakeBackend::with_files(&[], &["a.txt"]));
        let mut dashboard = selected(&backend).await;
        let old = dashboard.session().generation();

        dashboard.select_repository("/work/other");
        dashboard.settle().await;

        dashboard.apply(DashboardUpdate::Status(
            old,
            Ok(StatusReport {
                staged: vec![FileStatusEntry::new("A ", "stale.txt")],
                unstaged: vec![],
            }),
        ));
        assert_eq!(dashboard.working_tree().files(FileRole::Unstaged), vec!["a.txt"]);
        assert!(dashboard.working_tree().files(FileRole::Staged).is_empty());
    }

    #[tokio::test]
    async fn test_tree_loaded_once_opened() {
        let backend = Arc::new(FakeBackend::with_files(&[], &[]));
        let mut dashboard = selected(&backend).await;

        dashboard.open_tree();
        dashboard.settle().await;
        assert_eq!(backend.count("tree"), 1);
        assert_eq!(dashboard.tree().rows().len(), 1);

        dashboard.open_tree();
        dashboard.refresh();
        dashboard.settle().await;
        assert_eq!(backend.count("tree"), 2);
    }

    #[tokio::test]
    async fn test_fixed_remote_mode_skips_form() {
        let backend = Arc::new(FakeBackend::with_files(&[], &[]));
        let mut options = DashboardOptions::default();
        options.remote.mode = RemoteMode::Fixed;
        let mut dashboard = Dashboard::new(backend.clone(), options);
        dashboard.select_repository("/work/repo");
        dashboard.settle().await;

        assert!(!dashboard.open_remote_form(RemoteOperation::Push));
        dashboard.settle().await;
        assert_eq!(backend.count("push origin main"), 1);
        assert!(dashboard.remote_form().is_none());
    }

    #[tokio::test]
    async fn test_remote_form_with_no_remotes() {
        let backend = Arc::new(FakeBackend::with_files(&[], &[]));
        let mut dashboard = selected(&backend).await;

        assert!(dashboard.open_remote_form(RemoteOperation::Pull));
        dashboard.settle().await;

        let form = dashboard.remote_form().unwrap();
        assert_eq!(form.remotes().len(), 1);
        assert_eq!(form.remotes().selected_value(), Some("origin"));
        assert_eq!(form.branch(), "dev");
    }

    #[tokio::test]
    async fn test_diff_preselects_primary_and_requests() {
        let backend = Arc::new(FakeBackend::with_files(&[], &[]));
        let mut dashboard = selected(&backend).await;

        dashboard.open_diff();
        dashboard.settle().await;

        assert_eq!(dashboard.diff().target().selected_value(), Some("main"));
        assert_eq!(dashboard.diff().source().selected_value(), Some("HEAD"));
        assert_eq!(backend.count("diff main HEAD"), 1);
        assert_eq!(
            dashboard.diff().body(),
            &DiffBody::Ready(DiffOutcome::Changes(vec![FileDiff::new("a.txt")]))
        );
    }

    #[tokio::test]
    async fn test_switching_repository_resets_diff() {
        let backend = Arc::new(FakeBackend::with_files(&[], &[]));
        let mut dashboard = selected(&backend).await;

        dashboard.open_diff();
        dashboard.settle().await;
        assert!(matches!(dashboard.diff().body(), DiffBody::Ready(_)));

        dashboard.select_repository("/work/other");
        dashboard.settle().await;

        assert_eq!(dashboard.diff().body(), &DiffBody::Loading);
        assert_eq!(dashboard.diff().target().selected_value(), None);
        assert_eq!(dashboard.diff().source().selected_value(), None);
    }

    #[tokio::test]
    async fn test_graph_loading_then_ready() {
        let backend = Arc::new(FakeBackend::with_files(&[], &[]));
        let mut dashboard = selected(&backend).await;

        dashboard.open_graph();
        assert_eq!(dashboard.graph().state(), &GraphState::Loading);
        dashboard.settle().await;
        assert_eq!(dashboard.graph().graph().map(|g| g.len()), Some(1));
    }

    #[test]
    fn test_refresh_policy() {
        assert!(!Mutation::Push {
            remote: "origin".to_string(),
            branch: None
        }
        .requires_refresh());
        for mutation in [
            Mutation::Stage("a".to_string()),
            Mutation::Unstage("a".to_string()),
            Mutation::StageAll,
            Mutation::Commit("m".to_string()),
            Mutation::AssistedCommit,
            Mutation::CreateBranch("b".to_string()),
            Mutation::SwitchBranch("b".to_string()),
            Mutation::Pull {
                remote: "origin".to_string(),
                branch: "main".to_string(),
            },
            Mutation::RunCommand("status".to_string()),
        ] {
            assert!(mutation.requires_refresh(), "{:?}", mutation);
        }
    }
}
