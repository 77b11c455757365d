//! Shared harness for driving a full shell over mock collaborators.

#![allow(dead_code)]

use tether_core::geometry::Bounds;
use tether_shell::{Command, CommandSender, ExitReason, Shell, ShellConfig, channel};
use tether_test_utils::{AppLog, MockPlatform, RecordingApp};

pub struct Harness {
    pub shell: Shell,
    pub sender: CommandSender,
    pub log: AppLog,
    pub mocks: MockPlatform,
}

impl Harness {
    pub fn new(config: ShellConfig) -> Self {
        let (app, log) = RecordingApp::new();
        Self::with_app(app, log, config)
    }

    pub fn with_app(app: RecordingApp, log: AppLog, config: ShellConfig) -> Self {
        Self::with_mocks(app, log, config, MockPlatform::new())
    }

    pub fn with_mocks(app: RecordingApp, log: AppLog, config: ShellConfig, mocks: MockPlatform) -> Self {
        let (sender, receiver) = channel();
        let shell = Shell::new(app, config, mocks.platform(), receiver);
        Self {
            shell,
            sender,
            log,
            mocks,
        }
    }

    pub fn pump(&mut self) -> Option<ExitReason> {
        self.shell.pump()
    }

    /// Posts `command` and runs one cycle.
    pub fn send(&mut self, command: Command) -> Option<ExitReason> {
        assert!(self.sender.post(command));
        self.pump()
    }

    /// Brings the shell to the animating state and clears every record.
    pub fn animate(&mut self) {
        self.send(Command::InitWindow);
        self.send(Command::GainedFocus);
        assert!(self.shell.ctx().is_animating());
        self.clear();
    }

    pub fn clear(&self) {
        self.log.clear();
        self.mocks.graphics.clear_calls();
        self.mocks.bridge.clear_calls();
    }

    /// Publishes a content rect from another thread and pumps until the
    /// publisher returns.
    pub fn content_rect(&mut self, rect: Bounds) -> Option<Bounds> {
        let sender = &self.sender;
        let shell = &mut self.shell;
        std::thread::scope(|scope| {
            let publisher = scope.spawn(move || sender.set_content_rect(rect));
            while !publisher.is_finished() {
                shell.pump();
                std::thread::yield_now();
            }
            publisher.join().expect("publisher panicked")
        })
    }
}
