#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use jobrunner::config::{
    CommandSpec, ConfigFile, DefaultSection, JobConfig, RawConfigFile, RunnerSection,
};
use jobrunner::types::JobKind;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                runner: RunnerSection::default(),
                defaults: DefaultSection::default(),
                job: BTreeMap::new(),
            },
        }
    }

    pub fn with_job(mut self, name: &str, job: JobConfig) -> Self {
        self.config.job.insert(name.to_string(), job);
        self
    }

    pub fn with_root(mut self, name: &str) -> Self {
        self.config.runner.root = Some(name.to_string());
        self
    }

    pub fn with_default_strategy(mut self, strategy: &str) -> Self {
        self.config.defaults.error_strategy = Some(strategy.to_string());
        self
    }

    pub fn with_default_logger(mut self, logger: &str) -> Self {
        self.config.defaults.logger = Some(logger.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }

    pub fn build_shared(self) -> Arc<ConfigFile> {
        Arc::new(self.build())
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    pub fn shell(cmd: &str) -> Self {
        let mut job = JobConfig::new(JobKind::Shell);
        job.cmd = Some(CommandSpec::Line(cmd.to_string()));
        Self { job }
    }

    pub fn argv(argv: &[&str]) -> Self {
        let mut job = JobConfig::new(JobKind::Shell);
        job.cmd = Some(CommandSpec::Argv(argv.iter().map(|s| s.to_string()).collect()));
        Self { job }
    }

    pub fn group(steps: &[&str]) -> Self {
        Self::with_steps(JobKind::Group, steps)
    }

    pub fn parallel(steps: &[&str]) -> Self {
        Self::with_steps(JobKind::Parallel, steps)
    }

    pub fn cycle(job_name: &str, cycles: u32) -> Self {
        let mut job = JobConfig::new(JobKind::Cycle);
        job.job = Some(job_name.to_string());
        job.cycles = Some(cycles);
        Self { job }
    }

    pub fn background(cmd: &str) -> Self {
        let mut job = JobConfig::new(JobKind::Background);
        job.cmd = Some(CommandSpec::Line(cmd.to_string()));
        Self { job }
    }

    fn with_steps(kind: JobKind, steps: &[&str]) -> Self {
        let mut job = JobConfig::new(kind);
        job.steps = Some(steps.iter().map(|s| s.to_string()).collect());
        Self { job }
    }

    pub fn error_strategy(mut self, strategy: &str) -> Self {
        self.job.error_strategy = Some(strategy.to_string());
        self
    }

    pub fn on_failure(mut self, job_name: &str) -> Self {
        self.job.on_failure = Some(job_name.to_string());
        self
    }

    pub fn max_restarts(mut self, max: u32) -> Self {
        self.job.max_restarts = Some(max);
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.job.timeout_ms = Some(ms);
        self
    }

    pub fn logger(mut self, name: &str) -> Self {
        self.job.logger = Some(name.to_string());
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}
