//! The run session: state machine, relay, and edit flow.

use std::sync::mpsc;

use sandbench_assemble::{assemble, AssembledDocument};
use sandbench_bridge::{
    BridgeMessage, ChannelSink, ConsolePanel, HostCommand, HostMessage, RenderMode, RunnerMessage,
    SandboxReply, TestSpec,
};
use sandbench_files::{EditStore, FileRecord, FileSet, VirtualPath};
use sandbench_kv::SharedStore;
use sandbench_mockapi::{reset_mock_db, MockBackend};

use crate::{instrumentation_for, Error, ExecutionContext, ExerciseManifest, PanelView};

/// Host state machine: `Idle` (no document loaded) or `Loaded` (document
/// assigned, scripts executing). The only way back is an explicit rerun,
/// which replaces the context wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Idle,
    Loaded,
}

/// One exercise's workbench session.
///
/// Owns the virtual file set (seed + persisted edits), the console panel,
/// and, once [`run`](Self::run) has been called, the isolated execution
/// context. The context stays alive across panel visibility toggles; hiding
/// the preview to look at the console never tears down a running document.
pub struct Session {
    manifest: ExerciseManifest,
    files: FileSet,
    store: SharedStore,
    edits: EditStore<SharedStore>,
    panel: ConsolePanel,
    view: PanelView,
    state: HostState,
    context: Option<ExecutionContext>,
    console_rx: Option<mpsc::Receiver<BridgeMessage>>,
    reply_rx: Option<mpsc::Receiver<RunnerMessage>>,
}

impl Session {
    /// Open a session: seed the file set from the manifest and overlay
    /// whatever this exercise's learner previously saved.
    pub fn open(manifest: ExerciseManifest, store: SharedStore) -> Result<Self, Error> {
        let edits = EditStore::new(store.clone());
        let mut files = manifest.seed_files();
        files.apply_edits(&edits.load(&manifest.id)?);

        let view = manifest.default_panel();
        Ok(Session {
            manifest,
            files,
            store,
            edits,
            panel: ConsolePanel::new(RenderMode::Compact),
            view,
            state: HostState::Idle,
            context: None,
            console_rx: None,
            reply_rx: None,
        })
    }

    pub fn manifest(&self) -> &ExerciseManifest {
        &self.manifest
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn active_file(&self) -> Option<&FileRecord> {
        self.files.active_file()
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    /// Apply one editor change and persist the edit map.
    pub fn edit(&mut self, path: &VirtualPath, content: &str) -> Result<(), Error> {
        self.files.set_content(path, content)?;
        self.edits.save(&self.manifest.id, &self.files.edits())?;
        Ok(())
    }

    /// Revert the file set to seed and drop the persisted edits.
    pub fn reset_files(&mut self) -> Result<(), Error> {
        self.files.reset();
        self.edits.clear(&self.manifest.id)?;
        Ok(())
    }

    /// Trigger a run: clear the console, assemble a fresh document, and
    /// replace the execution context wholesale. Any messages still queued
    /// from the previous context are discarded with it.
    pub fn run(&mut self) -> Result<&AssembledDocument, Error> {
        self.panel.clear();

        let document = assemble(
            &self.files,
            &self.manifest.entry(),
            &instrumentation_for(&self.manifest),
        );

        let mut backend = MockBackend::new(self.manifest.id.clone(), self.store.clone())
            .with_chaos(self.manifest.chaos())
            .with_rules(self.manifest.collection_rules());
        if let Some(seed) = self.manifest.api_seed() {
            backend = backend.with_seed(seed);
        }

        let (sink, console_rx) = ChannelSink::pair();
        let (reply_tx, reply_rx) = mpsc::channel();

        self.context = Some(ExecutionContext::new(
            document,
            backend,
            Box::new(sink),
            reply_tx,
        ));
        self.console_rx = Some(console_rx);
        self.reply_rx = Some(reply_rx);
        self.state = HostState::Loaded;

        log::debug!("run started for exercise '{}'", self.manifest.id);
        match &self.context {
            Some(context) => Ok(context.document()),
            None => Err(Error::NotLoaded),
        }
    }

    /// The loaded document, if any.
    pub fn document(&self) -> Option<&AssembledDocument> {
        self.context.as_ref().map(ExecutionContext::document)
    }

    /// The sandbox side of the current context, for whatever drives the
    /// executed document (bindings in a deployment, tests here).
    pub fn context_mut(&mut self) -> Option<&mut ExecutionContext> {
        self.context.as_mut()
    }

    /// Drain pending bridge messages into the console panel, preserving
    /// emission order. Returns how many events were appended.
    pub fn pump(&mut self) -> usize {
        let Some(receiver) = &self.console_rx else {
            return 0;
        };
        let mut appended = 0;
        for message in receiver.try_iter() {
            if self.panel.accept(message) {
                appended += 1;
            }
        }
        appended
    }

    /// Drain pending protocol replies. Replies from a replaced context never
    /// show up here: their channel died with it.
    pub fn take_replies(&mut self) -> Vec<SandboxReply> {
        let Some(receiver) = &self.reply_rx else {
            return Vec::new();
        };
        receiver
            .try_iter()
            .filter(RunnerMessage::is_from_runner)
            .map(|message| message.reply)
            .collect()
    }

    pub fn panel(&self) -> &ConsolePanel {
        &self.panel
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.panel.set_mode(mode);
    }

    /// Render the console log in display order.
    pub fn render_console(&self) -> Vec<String> {
        self.panel.render()
    }

    /// The currently visible output panel.
    pub fn view(&self) -> PanelView {
        self.view
    }

    /// Toggle which panel is visible. Never touches the execution context:
    /// a running document keeps running while its panel is hidden.
    pub fn set_view(&mut self, view: PanelView) {
        self.view = view;
    }

    /// Ask the executing document to run assertion snippets.
    pub fn request_tests(&mut self, tests: Vec<TestSpec>) -> Result<(), Error> {
        let context = self.context.as_mut().ok_or(Error::NotLoaded)?;
        context.post_command(HostMessage::new(HostCommand::RunTests { tests }));
        Ok(())
    }

    /// Ask the executing document to evaluate its completion rule.
    pub fn request_completion(
        &mut self,
        rule: sandbench_bridge::CompletionRule,
    ) -> Result<(), Error> {
        let context = self.context.as_mut().ok_or(Error::NotLoaded)?;
        context.post_command(HostMessage::new(HostCommand::CheckComplete { rule }));
        Ok(())
    }

    /// Host-addressable mock reset: clears this exercise's persisted mock
    /// state and chaos counters, leaving any running context mounted.
    pub fn reset_mock(&mut self) -> Result<(), Error> {
        match self.context.as_mut() {
            Some(context) => context.reset_mock(),
            None => {
                reset_mock_db(&mut self.store, &self.manifest.id)?;
                Ok(())
            }
        }
    }
}
