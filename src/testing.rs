//! Test doubles shared by unit tests.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;

use crate::renderer::{RenderError, Renderer};

/// Records every renderer call; individual operations can be made to fail.
#[derive(Default)]
pub struct RecordingRenderer {
    calls: RefCell<Vec<String>>,
    failing: RefCell<HashSet<&'static str>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn fail_on(&self, op: &'static str) {
        self.failing.borrow_mut().insert(op);
    }

    fn record(&self, op: &str, detail: String) -> Result<(), RenderError> {
        self.calls.borrow_mut().push(detail);
        if self.failing.borrow().contains(op) {
            Err(RenderError::Failed(format!("{op} failed (injected)")))
        } else {
            Ok(())
        }
    }
}

impl Renderer for RecordingRenderer {
    fn render_local(&self, chart_dir: &Path) -> Result<(), RenderError> {
        self.record("render_local", format!("render_local {}", chart_dir.display()))
    }

    fn render_remote(
        &self,
        chart: &str,
        alias: &str,
        version: &str,
        values: &Path,
    ) -> Result<(), RenderError> {
        self.record(
            "render_remote",
            format!("render_remote {chart} {alias} {version} {}", values.display()),
        )
    }

    fn dependency_build(&self, chart_dir: &Path) -> Result<(), RenderError> {
        self.record(
            "dependency_build",
            format!("dependency_build {}", chart_dir.display()),
        )
    }

    fn repo_add(&self, alias: &str, url: &str) -> Result<(), RenderError> {
        self.record("repo_add", format!("repo_add {alias} {url}"))
    }

    fn repo_update(&self, alias: &str) -> Result<(), RenderError> {
        self.record("repo_update", format!("repo_update {alias}"))
    }

    fn repo_remove(&self, alias: &str) -> Result<(), RenderError> {
        self.record("repo_remove", format!("repo_remove {alias}"))
    }
}
