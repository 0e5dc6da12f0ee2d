use std::fmt;

use log::debug;
use nix::unistd::Pid;

use crate::errors::Result;

/// Lifecycle of a background job.
///
/// `Done` and `Killed` are discovered lazily; they become `Reaped` once a
/// listing has reported them, and `Reaped` jobs are dropped from the table on
/// the next traversal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobState {
    Running,
    Done,
    Killed,
    Reaped,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            JobState::Running => write!(f, "Running"),
            JobState::Done => write!(f, "Done"),
            JobState::Killed => write!(f, "Terminated"),
            JobState::Reaped => write!(f, "Reaped"),
        }
    }
}

/// Non-destructive questions and forceful requests about a process.
pub trait ProcessProbe {
    /// `true` if `pid` still refers to a live process.
    fn is_alive(&self, pid: Pid) -> bool;
    /// Terminates `pid` without a grace period.
    fn terminate(&self, pid: Pid) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Job {
    pid: Pid,
    command: String,
    state: JobState,
}

impl Job {
    pub fn new(pid: Pid, command: &str) -> Self {
        Self {
            pid,
            command: command.to_string(),
            state: JobState::Running,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_reaped(&self) -> bool {
        self.state == JobState::Reaped
    }

    /// Moves a running job to `Done` if its process is gone.
    fn refresh(&mut self, probe: &dyn ProcessProbe) {
        if self.state == JobState::Running && !probe.is_alive(self.pid) {
            debug!("job {} ({}) is done", self.pid, self.command);
            self.state = JobState::Done;
        }
    }
}

/// One line of a `jobs` listing.
#[derive(Clone, Debug, PartialEq)]
pub struct JobListing {
    pub id: usize,
    pub pid: Pid,
    pub state: JobState,
    pub command: String,
}

impl fmt::Display for JobListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]\t{}\t{}\t{}",
            self.id, self.pid, self.state, self.command
        )
    }
}

/// How `kill` names a job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobSelector {
    /// Dense 1-based position among unreaped jobs
    Id(usize),
    Pid(Pid),
}

/// Background jobs in insertion order.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn add(&mut self, pid: Pid, command: &str) {
        debug!("tracking background job {} ({})", pid, command);
        self.jobs.push(Job::new(pid, command));
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.iter().all(Job::is_reaped)
    }

    /// Drops reaped jobs.
    pub fn reap(&mut self) {
        self.jobs.retain(|j| !j.is_reaped());
    }

    /// Reports every unreaped job, numbered 1..n in insertion order.
    ///
    /// Jobs reaped earlier are removed first; jobs reported as `Done` or
    /// `Terminated` here are reaped by the report.
    pub fn list(&mut self, probe: &dyn ProcessProbe) -> Vec<JobListing> {
        self.reap();

        let mut listings = Vec::with_capacity(self.jobs.len());
        for (i, job) in self.jobs.iter_mut().enumerate() {
            job.refresh(probe);
            listings.push(JobListing {
                id: i + 1,
                pid: job.pid,
                state: job.state,
                command: job.command.clone(),
            });
            if job.state != JobState::Running {
                job.state = JobState::Reaped;
            }
        }

        listings
    }

    /// Looks up an unreaped job by its dense listing id.
    pub fn find_by_id(&mut self, id: usize) -> Option<&mut Job> {
        if id == 0 {
            return None;
        }
        self.jobs.iter_mut().filter(|j| !j.is_reaped()).nth(id - 1)
    }

    /// Looks up an unreaped job by the pid of its final stage.
    pub fn find_by_pid(&mut self, pid: Pid) -> Option<&mut Job> {
        self.jobs
            .iter_mut()
            .find(|j| !j.is_reaped() && j.pid == pid)
    }

    /// Sends the forceful terminate to the selected job and marks it `Killed`.
    ///
    /// Returns `Ok(None)` if no unreaped job matches.
    pub fn kill(
        &mut self,
        selector: JobSelector,
        probe: &dyn ProcessProbe,
    ) -> Result<Option<Pid>> {
        let job = match selector {
            JobSelector::Id(id) => self.find_by_id(id),
            JobSelector::Pid(pid) => self.find_by_pid(pid),
        };

        match job {
            Some(job) => {
                probe.terminate(job.pid)?;
                debug!("killed job {} ({})", job.pid, job.command);
                job.state = JobState::Killed;
                Ok(Some(job.pid))
            }
            None => Ok(None),
        }
    }

    /// `true` if any job not yet known to be finished still has a live process.
    ///
    /// Killed jobs do not count, even while their process awaits reaping.
    pub fn has_running_jobs(&mut self, probe: &dyn ProcessProbe) -> bool {
        let mut running = false;
        for job in self.jobs.iter_mut() {
            job.refresh(probe);
            running |= job.state == JobState::Running;
        }
        running
    }
}
