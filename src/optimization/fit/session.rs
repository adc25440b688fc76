//! Per-fit mutable state: the evaluation counter, progress reporting and
//! flush rate limiting.
//!
//! A [`FitSession`] is created by each `optimize_log` call and dropped when
//! it returns, so concurrent fits never share counters.
use std::{
    cell::{Cell, RefCell},
    io::{self, Write},
    time::{Duration, Instant},
};

use tracing::{info, warn};

use crate::{optimization::loglik_optimizer::Theta, spectrum::io::flat::format_general};

/// One progress line: how many evaluations so far, the log-likelihood
/// handed to the optimizer (penalty included) and the natural-space
/// parameters.
#[derive(Debug, Clone, Copy)]
pub struct ProgressReport<'a> {
    pub evaluation: u64,
    pub log_likelihood: f64,
    pub params: &'a Theta,
}

/// Receives progress reports from a running fit.
pub trait ProgressObserver {
    fn observe(&self, report: &ProgressReport<'_>) -> io::Result<()>;

    /// Push buffered output. Called at most once per flush delay.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Emits each report as a `tracing` `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn observe(&self, report: &ProgressReport<'_>) -> io::Result<()> {
        info!(
            evaluation = report.evaluation,
            log_likelihood = report.log_likelihood,
            params = ?report.params.to_vec(),
            "sfs fit progress"
        );
        Ok(())
    }
}

/// Writes `evaluation, log-likelihood, [params]` lines to any writer.
///
/// Numbers use `%g`-style formatting with six significant digits.
#[derive(Debug)]
pub struct WriterObserver<W: Write> {
    writer: RefCell<W>,
}

impl<W: Write> WriterObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: RefCell::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> ProgressObserver for WriterObserver<W> {
    fn observe(&self, report: &ProgressReport<'_>) -> io::Result<()> {
        let params: Vec<String> = report.params.iter().map(|p| format_general(*p, 6)).collect();
        writeln!(
            self.writer.borrow_mut(),
            "{:<8}, {:<12}, [{}]",
            report.evaluation,
            format_general(report.log_likelihood, 6),
            params.join(", ")
        )
    }

    fn flush(&self) -> io::Result<()> {
        self.writer.borrow_mut().flush()
    }
}

/// Counter and reporting state for one fit.
pub struct FitSession<'o> {
    observer: &'o dyn ProgressObserver,
    report_every: Option<u64>,
    flush_delay: Duration,
    evaluations: Cell<u64>,
    last_flush: Cell<Option<Instant>>,
}

impl<'o> FitSession<'o> {
    /// `report_every = None` or `Some(0)` disables reporting.
    pub fn new(
        observer: &'o dyn ProgressObserver, report_every: Option<u64>, flush_delay: Duration,
    ) -> Self {
        Self {
            observer,
            report_every: report_every.filter(|&k| k > 0),
            flush_delay,
            evaluations: Cell::new(0),
            last_flush: Cell::new(None),
        }
    }

    /// Objective evaluations recorded so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    /// Count one evaluation and report it if it falls on the reporting
    /// interval. Observer I/O failures are logged and otherwise ignored so
    /// they never stop the search.
    pub fn record(&self, log_likelihood: f64, params: &Theta) {
        let evaluation = self.evaluations.get() + 1;
        self.evaluations.set(evaluation);
        let Some(every) = self.report_every else {
            return;
        };
        if evaluation % every != 0 {
            return;
        }
        let report = ProgressReport { evaluation, log_likelihood, params };
        if let Err(err) = self.observer.observe(&report) {
            warn!(error = %err, evaluation, "progress observer failed");
        }
        self.flush_if_due();
    }

    fn flush_if_due(&self) {
        let now = Instant::now();
        let due = self
            .last_flush
            .get()
            .map_or(true, |last| now.duration_since(last) >= self.flush_delay);
        if !due {
            return;
        }
        if let Err(err) = self.observer.flush() {
            warn!(error = %err, "progress observer flush failed");
        }
        self.last_flush.set(Some(now));
    }
}

impl std::fmt::Debug for FitSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitSession")
            .field("report_every", &self.report_every)
            .field("flush_delay", &self.flush_delay)
            .field("evaluations", &self.evaluations.get())
            .finish()
    }
}
