use std::collections::VecDeque;

use crate::{
    command::{execute, Command},
    transport::Backend,
    view::ViewState,
};

/// Owns the view state and drives commands against a backend one at a time.
pub struct ViewController<B: Backend> {
    backend: B,
    state: ViewState,
}

impl<B: Backend> ViewController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: ViewState::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    pub async fn start(&mut self) -> usize {
        let commands = self.state.start();
        self.run_all(commands).await
    }

    /// Runs `command` and every follow-up it produces. Returns how many requests were sent.
    pub async fn run(&mut self, command: Option<Command>) -> usize {
        self.run_all(command).await
    }

    pub async fn run_all(&mut self, commands: impl IntoIterator<Item = Command>) -> usize {
        let mut queue: VecDeque<Command> = commands.into_iter().collect();
        let mut sent = 0;
        while let Some(command) = queue.pop_front() {
            sent += 1;
            let outcome = execute(&self.backend, command).await;
            queue.extend(self.state.apply(outcome));
        }
        sent
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
