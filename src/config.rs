//! Policy selection and run configuration.
//!
//! A `SimConfig` is validated when it is built, so an invalid quantum or a
//! Round-Robin run without one never reaches the engine.

use crate::core::Ticks;
use crate::error::{SimError, SimResult};
use crate::scheduler::RequeueOrder;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

/// Scheduling policy choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// First-come-first-served, non-preemptive
    Fcfs,
    /// Shortest job first, non-preemptive
    Sjf,
    /// Shortest remaining time first, preemptive
    Srtf,
    /// Round-robin with a fixed time quantum
    RoundRobin,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [Self::Fcfs, Self::Sjf, Self::Srtf, Self::RoundRobin];

    /// Map the interactive menu numbers (1-4) to a policy.
    pub fn from_menu_choice(choice: i64) -> SimResult<Self> {
        match choice {
            1 => Ok(Self::Fcfs),
            2 => Ok(Self::Sjf),
            3 => Ok(Self::Srtf),
            4 => Ok(Self::RoundRobin),
            other => Err(SimError::UnsupportedPolicy(other.to_string())),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::Sjf => "sjf",
            Self::Srtf => "srtf",
            Self::RoundRobin => "round_robin",
        }
    }

    pub const fn menu_label(&self) -> &'static str {
        match self {
            Self::Fcfs => "FCFS",
            Self::Sjf => "SJF (Non-preemptive)",
            Self::Srtf => "SRTF (Preemptive)",
            Self::RoundRobin => "Round Robin",
        }
    }

    pub const fn needs_quantum(&self) -> bool {
        matches!(self, Self::RoundRobin)
    }
}

impl FromStr for PolicyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fcfs" | "fifo" => Ok(Self::Fcfs),
            "sjf" => Ok(Self::Sjf),
            "srtf" | "srt" => Ok(Self::Srtf),
            "round_robin" | "roundrobin" | "rr" => Ok(Self::RoundRobin),
            _ => Err(SimError::UnsupportedPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PolicyKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PolicyKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Round-Robin time slice, always at least one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Quantum(NonZeroU64);

impl Quantum {
    pub fn new(ticks: i64) -> SimResult<Self> {
        u64::try_from(ticks)
            .ok()
            .and_then(NonZeroU64::new)
            .map(Self)
            .ok_or(SimError::InvalidQuantum(ticks))
    }

    #[inline]
    pub const fn get(&self) -> Ticks {
        self.0.get()
    }
}

impl fmt::Display for Quantum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to pick and parameterise a policy for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimConfig {
    pub policy: PolicyKind,
    pub quantum: Option<Quantum>,
    pub requeue: RequeueOrder,
}

impl SimConfig {
    /// Build a validated config. A supplied quantum must be positive even for
    /// policies that ignore it; Round-Robin requires one.
    pub fn new(policy: PolicyKind, quantum: Option<i64>) -> SimResult<Self> {
        let quantum = quantum.map(Quantum::new).transpose()?;
        if policy.needs_quantum() && quantum.is_none() {
            return Err(SimError::MissingQuantum);
        }

        Ok(Self {
            policy,
            quantum,
            requeue: RequeueOrder::default(),
        })
    }

    pub fn fcfs() -> Self {
        Self::plain(PolicyKind::Fcfs)
    }

    pub fn sjf() -> Self {
        Self::plain(PolicyKind::Sjf)
    }

    pub fn srtf() -> Self {
        Self::plain(PolicyKind::Srtf)
    }

    pub fn round_robin(quantum: i64) -> SimResult<Self> {
        Self::new(PolicyKind::RoundRobin, Some(quantum))
    }

    fn plain(policy: PolicyKind) -> Self {
        Self {
            policy,
            quantum: None,
            requeue: RequeueOrder::default(),
        }
    }

    pub fn with_requeue(mut self, requeue: RequeueOrder) -> Self {
        self.requeue = requeue;
        self
    }
}

impl<'de> Deserialize<'de> for SimConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Inner {
            policy: PolicyKind,
            #[serde(default)]
            quantum: Option<i64>,
            #[serde(default)]
            requeue: RequeueOrder,
        }

        let inner = Inner::deserialize(deserializer)?;
        Self::new(inner.policy, inner.quantum)
            .map(|config| config.with_requeue(inner.requeue))
            .map_err(serde::de::Error::custom)
    }
}
