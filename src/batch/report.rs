//! Console report lines
//!
//! Everything the operator watches during a run goes through [`Reporter`].
//! Diagnostics go to `tracing`; this is the plain stdout transcript.

use super::Aggregate;
use crate::checkpoint::{CheckpointStore, ResumeSource};
use crate::types::{Contractor, IdvResult};
use crate::utils::{format_usd, truncate_chars};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

const RULE_WIDTH: usize = 70;
const LISTING_WIDTH: usize = 110;
const ORDER_DESCRIPTION_CHARS: usize = 70;
const LISTING_DESCRIPTION_CHARS: usize = 40;

/// Writes progress and summary lines to `W` (stdout in the binary)
pub struct Reporter<W: Write = io::Stdout> {
    out: W,
}

impl Reporter<io::Stdout> {
    /// Reporter on standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    /// Wrap any writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// The underlying writer
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Before the input file is read
    pub fn loading(&mut self, input: &Path) -> io::Result<()> {
        writeln!(self.out, "Loading contractors from {}", input.display())
    }

    /// Run banner once the contractor list is in memory
    pub fn loaded(&mut self, contractor_count: usize, request_delay: Duration) -> io::Result<()> {
        writeln!(self.out, "Loaded {contractor_count} contractors")?;
        writeln!(
            self.out,
            "Querying FPDS ATOM feed for task orders under each IDV"
        )?;
        writeln!(
            self.out,
            "Rate limit delay: {:?} between queries",
            request_delay
        )?;
        writeln!(self.out)
    }

    /// Which resume source was used, if any
    pub fn resumed(&mut self, checkpoint: &CheckpointStore) -> io::Result<()> {
        match checkpoint.source() {
            ResumeSource::Output => writeln!(
                self.out,
                "Resuming: {} IDVs already queried",
                checkpoint.completed_count()
            ),
            ResumeSource::Progress => writeln!(
                self.out,
                "Resuming from progress file: {} already done",
                checkpoint.completed_count()
            ),
            ResumeSource::None => Ok(()),
        }
    }

    /// Prior result reused
    pub fn cached(
        &mut self,
        position: usize,
        total: usize,
        contractor: &Contractor,
        task_order_count: usize,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "[{position}/{total}] {} ({}) - CACHED ({task_order_count} task orders)",
            contractor.name, contractor.award_number
        )
    }

    /// Listed in the progress file without a saved result
    pub fn skipped(&mut self, position: usize, total: usize, contractor: &Contractor) -> io::Result<()> {
        writeln!(
            self.out,
            "[{position}/{total}] {} ({}) - skipped (in progress file)",
            contractor.name, contractor.award_number
        )
    }

    /// About to fetch
    pub fn fetching(&mut self, position: usize, total: usize, contractor: &Contractor) -> io::Result<()> {
        writeln!(
            self.out,
            "[{position}/{total}] {} ({})",
            contractor.name, contractor.award_number
        )
    }

    /// Result of a successful fetch, one line per task order
    pub fn fetched(&mut self, result: &IdvResult) -> io::Result<()> {
        if result.task_orders.is_empty() {
            return writeln!(self.out, "    -> 0 task orders");
        }

        writeln!(
            self.out,
            "    -> {} task orders, ${} obligated",
            result.task_order_count,
            format_usd(result.total_obligated)
        )?;
        for order in &result.task_orders {
            writeln!(
                self.out,
                "       {} | {} | ${} | {}",
                order.piid,
                order.action_type_description,
                format_usd(order.obligated_amount),
                truncate_chars(&order.description, ORDER_DESCRIPTION_CHARS)
            )?;
        }
        Ok(())
    }

    /// A fetch failed; the batch goes on
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "    ERROR: {message}")
    }

    /// Before an intermediate flush
    pub fn saving(&mut self, total_task_orders: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "    [Saving intermediate... {total_task_orders} task orders so far]"
        )
    }

    /// Totals, errors and the output location
    pub fn summary(&mut self, aggregate: &Aggregate, output: &Path) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out)?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "FPDS TASK ORDER FETCH COMPLETE")?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "  IDVs queried:          {}", aggregate.idvs.len())?;
        writeln!(
            self.out,
            "  IDVs with task orders: {}",
            aggregate.idvs_with_task_orders()
        )?;
        writeln!(
            self.out,
            "  Total task orders:     {}",
            aggregate.total_task_orders
        )?;
        writeln!(
            self.out,
            "  Total obligated:       ${}",
            format_usd(aggregate.total_obligated)
        )?;
        if !aggregate.errors.is_empty() {
            writeln!(self.out, "  Errors:                {}", aggregate.errors.len())?;
            for entry in &aggregate.errors {
                writeln!(self.out, "    - {}: {}", entry.name, entry.error)?;
            }
        }
        writeln!(self.out)?;
        writeln!(self.out, "Output: {}", output.display())
    }

    /// Every collected task order, largest obligation first
    pub fn ranked_listing(&mut self, aggregate: &Aggregate) -> io::Result<()> {
        if aggregate.task_orders.is_empty() {
            return Ok(());
        }

        let mut ranked: Vec<_> = aggregate.task_orders.iter().collect();
        ranked.sort_by(|a, b| b.obligated_amount.total_cmp(&a.obligated_amount));

        writeln!(self.out)?;
        writeln!(self.out, "All task orders found:")?;
        writeln!(
            self.out,
            "{:<20} {:<35} {:>15} Description",
            "PIID", "Vendor", "Obligated"
        )?;
        writeln!(self.out, "{}", "-".repeat(LISTING_WIDTH))?;
        for order in ranked {
            writeln!(
                self.out,
                "{:<20} {:<35} ${:>14} {}",
                order.piid,
                order.vendor_name,
                format_usd(order.obligated_amount),
                truncate_chars(&order.description, LISTING_DESCRIPTION_CHARS)
            )?;
        }
        Ok(())
    }

    /// Flush the writer
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
