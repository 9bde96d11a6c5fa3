pub mod appset;
pub mod classify;
pub mod discovery;
pub mod renderer;
pub mod report;
pub mod runner;
pub mod yamlpath;

#[cfg(test)]
pub(crate) mod testing;
