//! The parse context: one emulator instance behind one engine run.
//!
//! The legacy implementation kept a process-wide resource pointer that
//! every boundary call dereferenced. Here the context is an explicit
//! value passed by reference through the whole call chain: exactly one
//! exists per [`run_parse`] call and nothing is global.

use serde_json::Value;

use specbridge_core::{shape, Line, RecordStream, StreamConfig};
use specbridge_tracker::{InputLedger, UsageTracker};

use crate::error::{ParseError, Warning};

/// Stream configuration for one parse. See [`StreamConfig`] for the
/// grouped-record conveniences.
pub type ParseOptions = StreamConfig;

/// State shared by every boundary-protocol call of one parse.
pub struct ParseContext<'a> {
    stream: RecordStream<'a>,
    tracker: Box<dyn UsageTracker>,
    warnings: Vec<Warning>,
}

impl<'a> ParseContext<'a> {
    /// Build a context over a borrowed document with the default
    /// in-memory usage ledger.
    pub fn new(doc: &'a Value, options: ParseOptions) -> Self {
        let tracker = Box::new(InputLedger::new(doc));
        Self::with_tracker(doc, options, tracker)
    }

    /// Build a context with a caller-supplied tracker.
    pub fn with_tracker(
        doc: &'a Value,
        options: ParseOptions,
        tracker: Box<dyn UsageTracker>,
    ) -> Self {
        ParseContext {
            stream: RecordStream::new(doc, options),
            tracker,
            warnings: Vec::new(),
        }
    }

    // ── Scope lifecycle ──────────────────────────────────────────────

    /// Descend into the named subtree. Scopes must nest correctly.
    pub fn open_scope(&mut self, name: &str) -> Result<(), ParseError> {
        self.stream.cursor_mut().enter_subtree(name)?;
        self.tracker.open_scope(name);
        Ok(())
    }

    /// Climb out of the innermost scope. Closing more than opening is
    /// fatal.
    pub fn close_scope(&mut self) -> Result<(), ParseError> {
        self.stream.cursor_mut().exit_subtree()?;
        self.tracker.close_scope();
        Ok(())
    }

    /// Current zoom depth.
    pub fn depth(&self) -> usize {
        self.stream.cursor().depth()
    }

    // ── Scalar reads ─────────────────────────────────────────────────

    pub fn read_real(&mut self, name: &str) -> Result<f64, ParseError> {
        let value = self.stream.cursor().read_scalar(name)?;
        self.tracker.mark_used(name);
        Ok(value)
    }

    pub fn read_integer(&mut self, name: &str) -> Result<i64, ParseError> {
        let value = self.stream.cursor().read_scalar(name)?;
        self.tracker.mark_used(name);
        Ok(value)
    }

    pub fn read_logical(&mut self, name: &str) -> Result<bool, ParseError> {
        let value = self.stream.cursor().read_scalar(name)?;
        self.tracker.mark_used(name);
        Ok(value)
    }

    /// Read a bounded string. Returns the clamped data and the actual
    /// length; exceeding the bound records a truncation warning.
    pub fn read_string(
        &mut self,
        name: &str,
        max_len: usize,
    ) -> Result<(String, usize), ParseError> {
        let read = self.stream.cursor().read_string(name, max_len)?;
        if read.truncated {
            self.warnings.push(Warning::Truncated {
                key: name.to_string(),
                len: read.len,
                max_len,
            });
        }
        self.tracker.mark_used(name);
        Ok((read.data, read.len))
    }

    // ── Timed arrays ─────────────────────────────────────────────────

    /// Advertised lengths of the time axis and the named values.
    pub fn read_timed_array_size(&self, name: &str) -> (usize, usize) {
        let current = self.stream.cursor().current();
        (
            shape::sibling_field_count(current, "time"),
            shape::sibling_field_count(current, name),
        )
    }

    /// Fill both halves of a time-paired array.
    pub fn read_timed_array_data(
        &mut self,
        name: &str,
        times: &mut [f64],
        vals: &mut [f64],
    ) -> Result<(), ParseError> {
        self.stream.cursor().read_timed_array(name, times, vals)?;
        self.tracker.mark_used(name);
        self.tracker.mark_used("time");
        Ok(())
    }

    // ── Named tables ─────────────────────────────────────────────────

    /// Dimensions of the numeric table at the current subtree: the
    /// number of numeric rows and the element count of the first row's
    /// field. Advances the row enumeration by one, which
    /// [`read_named_table_row`] accounts for.
    ///
    /// [`read_named_table_row`]: ParseContext::read_named_table_row
    pub fn read_named_table_size(&mut self) -> Result<(usize, usize), ParseError> {
        let rows = shape::numeric_record_count(self.stream.cursor().current())?;
        let first = self.stream.cursor_mut().first_enumerable_field_name()?;
        let cols = shape::sibling_field_count(self.stream.cursor().current(), &first);
        Ok((rows, cols))
    }

    /// Read table row `row` (1-based): returns the row's name and copies
    /// its values into `vals`.
    pub fn read_named_table_row(
        &mut self,
        row: usize,
        vals: &mut [f64],
    ) -> Result<String, ParseError> {
        let read_count = self.stream.cursor().record_read_count();
        if row == 0 || read_count == 0 {
            return Err(ParseError::OutOfOrder {
                call: "read_named_table_row",
            });
        }
        let position = (row - 1) + (read_count - 1);
        let current = self.stream.cursor().current();
        let elem = current
            .get(position)
            .ok_or(specbridge_core::DocError::MalformedRecord { position })?;
        let (key, value) = shape::single_key(elem, position)?;
        let entries = value
            .as_array()
            .ok_or(specbridge_core::DocError::TypeMismatch {
                key: key.to_string(),
                expected: "an array of numbers",
            })?;
        if entries.len() != vals.len() {
            return Err(specbridge_core::DocError::LengthMismatch {
                key: key.to_string(),
                expected: vals.len(),
                actual: entries.len(),
            }
            .into());
        }
        for (slot, entry) in vals.iter_mut().zip(entries) {
            *slot = entry
                .as_f64()
                .ok_or(specbridge_core::DocError::TypeMismatch {
                    key: key.to_string(),
                    expected: "an array of numbers",
                })?;
        }
        let key = key.to_string();
        self.tracker.mark_used(&key);
        Ok(key)
    }

    // ── Record stream ────────────────────────────────────────────────

    /// Size hint for the next record group.
    pub fn read_line_size(&mut self) -> usize {
        self.stream.line_record_count()
    }

    /// Next line of the record stream: `(name, data, done)`. `done`
    /// means the current group is exhausted and carries no name/data.
    ///
    /// The stream descends into record bodies and climbs out of them on
    /// its own; those moves are mirrored into the tracker so its scope
    /// depth stays in step with the cursor and engine-issued closes of
    /// auto-opened scopes balance out.
    pub fn read_line(&mut self) -> Result<(String, String, bool), ParseError> {
        let depth_before = self.stream.cursor().depth();
        let line = self.stream.read_line()?;
        let key = self.stream.scanned_key().to_string();
        self.tracker.set_current_key(&key);
        let depth_after = self.stream.cursor().depth();
        if depth_after > depth_before {
            self.tracker.open_scope(&key);
        } else if depth_after < depth_before {
            self.tracker.close_scope();
        }
        match line {
            Line::Field { name, data } => {
                self.tracker.check_line(&name);
                Ok((name, data, false))
            }
            Line::GroupEnd => {
                self.tracker.check_line("");
                Ok((String::new(), String::new(), true))
            }
        }
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    /// Warnings accumulated so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Declared top-level keys of the document, in sorted order.
    pub fn declared_vars(&self) -> &[String] {
        self.stream.cursor().declared_vars()
    }

    /// Diagnostic ordinal of a declared top-level key.
    pub fn var_index(&self, name: &str) -> Result<usize, ParseError> {
        Ok(self.stream.cursor().var_index(name)?)
    }

    pub(crate) fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    pub(crate) fn check_all_used(&self) -> Result<(), ParseError> {
        Ok(self.tracker.check_all_used()?)
    }
}

/// Outcome of a validated parse: the consumer's value plus any warnings.
#[derive(Debug)]
pub struct ParseOutcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

/// Run one engine pass over a document with guaranteed teardown.
///
/// Builds the single parse context, hands it to `consumer` (the engine),
/// and on success verifies that every scope was closed and every declared
/// input consumed. A consumer error propagates as-is; the context never
/// survives this call on any exit path.
pub fn run_parse<'a, T, F>(
    doc: &'a Value,
    options: ParseOptions,
    consumer: F,
) -> Result<ParseOutcome<T>, ParseError>
where
    F: FnOnce(&mut ParseContext<'a>) -> Result<T, ParseError>,
{
    let mut ctx = ParseContext::new(doc, options);
    let value = consumer(&mut ctx)?;
    if ctx.depth() != 0 {
        return Err(ParseError::Tracker(
            specbridge_tracker::TrackerError::UnbalancedScope,
        ));
    }
    ctx.check_all_used()?;
    Ok(ParseOutcome {
        value,
        warnings: ctx.into_warnings(),
    })
}
