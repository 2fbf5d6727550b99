//! Scripted [`CommandRunner`] for unit tests.

use crate::runner::{display_command, CommandOutput, CommandRunner};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

type Hook = Box<dyn Fn(&FakeRunner)>;

/// Answers commands from a table keyed by the full command line. Unknown
/// commands fail to spawn, like a program that does not exist. Hooks run
/// after a matching command and can mutate the table or the filesystem to
/// simulate what the real program would have done.
#[derive(Default)]
pub struct FakeRunner {
    responses: RefCell<HashMap<String, CommandOutput>>,
    hooks: RefCell<HashMap<String, Hook>>,
    path: RefCell<HashSet<String>>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, command: impl Into<String>, output: CommandOutput) {
        self.responses.borrow_mut().insert(command.into(), output);
    }

    pub fn on_run(&self, command: impl Into<String>, hook: impl Fn(&FakeRunner) + 'static) {
        self.hooks.borrow_mut().insert(command.into(), Box::new(hook));
    }

    pub fn put_on_path(&self, program: &str) {
        self.path.borrow_mut().insert(program.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn was_called(&self, command: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == command)
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
        let line = display_command(program, args);
        self.calls.borrow_mut().push(line.clone());
        let output = self.responses.borrow().get(&line).cloned();
        match output {
            Some(out) => {
                if let Some(hook) = self.hooks.borrow().get(&line) {
                    hook(self);
                }
                Ok(out)
            }
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{program}: command not found"),
            )),
        }
    }

    fn on_path(&self, program: &str) -> bool {
        self.path.borrow().contains(program)
    }
}
