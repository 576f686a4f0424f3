//! Continuous CPU profiling via Pyroscope.
//!
//! The pprof backend samples this process on a timer and the agent pushes
//! profiles to the collector from its own thread. Only the current process is
//! sampled; child processes are never attached.

use std::fmt;

use pyroscope::pyroscope::PyroscopeAgentRunning;
use pyroscope::{PyroscopeAgent, PyroscopeError};
use pyroscope_pprofrs::{pprof_backend, PprofConfig};
use thiserror::Error;

use crate::config::ObservabilityConfig;
use crate::observability::collector_url;

/// Errors raised while starting or stopping the profiler.
#[derive(Debug, Error)]
pub enum ProfilingError {
    #[error("invalid Pyroscope endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("pyroscope agent error: {0}")]
    Agent(#[from] PyroscopeError),
}

/// A running profiler bound to one service identity.
pub struct ProfilerSession {
    agent: PyroscopeAgent<PyroscopeAgentRunning>,
    application: String,
    server: String,
}

impl ProfilerSession {
    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Stop sampling, push the last profile and join the agent threads.
    pub fn stop(self) -> Result<(), ProfilingError> {
        let ready = self.agent.stop()?;
        ready.shutdown();
        Ok(())
    }
}

impl fmt::Debug for ProfilerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfilerSession")
            .field("application", &self.application)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

/// Configure and start the profiler.
///
/// Sampling begins immediately on success. Errors are returned untouched;
/// isolating them is the bootstrap's job.
pub fn init_profiling(config: &ObservabilityConfig) -> Result<ProfilerSession, ProfilingError> {
    collector_url(&config.pyroscope_endpoint).map_err(|reason| ProfilingError::Endpoint {
        endpoint: config.pyroscope_endpoint.clone(),
        reason,
    })?;

    let backend = pprof_backend(PprofConfig::new().sample_rate(config.profiling_sample_rate));

    let agent = PyroscopeAgent::builder(
        config.pyroscope_endpoint.as_str(),
        config.service_name.as_str(),
    )
    .backend(backend)
    .build()?;

    let agent = agent.start()?;

    Ok(ProfilerSession {
        agent,
        application: config.service_name.clone(),
        server: config.pyroscope_endpoint.clone(),
    })
}
