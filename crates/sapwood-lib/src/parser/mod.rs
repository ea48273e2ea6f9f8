//! Parse orchestration.
//!
//! The [`Parser`] owns the language and the limits; the grammar's
//! [`ParseTask`](crate::ParseTask) does the work in small steps. Between steps
//! the parser checks the cancellation flag and the deadline, and keeps an
//! interrupted task around so the next call can resume it.

mod input;

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rustc_hash::FxHasher;
use sapwood_core::{InputEncoding, LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION, Range};

use crate::language::{Language, ParseStep, ParseTask};
use crate::tree::{Tree, TreeBuilder};
use crate::{Error, Result};

pub use input::ParseInput;

/// Grammar steps between cancellation and timeout checks.
const CHECK_INTERVAL: u32 = 100;

/// Shared flag that asks an in-flight parse to stop.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Parser configuration, applied with [`Parser::with_options`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    timeout: Option<Duration>,
    included_ranges: Option<Vec<Range>>,
    cancellation_flag: Option<CancellationFlag>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_included_ranges(mut self, ranges: Vec<Range>) -> Self {
        self.included_ranges = Some(ranges);
        self
    }

    pub fn with_cancellation_flag(mut self, flag: CancellationFlag) -> Self {
        self.cancellation_flag = Some(flag);
        self
    }
}

struct PendingParse {
    task: Box<dyn ParseTask>,
    builder: TreeBuilder,
    steps: u64,
    /// The text the task was started on.
    input: InputFingerprint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InputFingerprint {
    len: usize,
    encoding: InputEncoding,
    hash: u64,
}

impl InputFingerprint {
    fn new(text: &[u8], encoding: InputEncoding) -> Self {
        let mut hasher = FxHasher::default();
        text.hash(&mut hasher);
        Self {
            len: text.len(),
            encoding,
            hash: hasher.finish(),
        }
    }
}

/// Produces [`Tree`]s from source text.
pub struct Parser {
    language: Option<Language>,
    included_ranges: Vec<Range>,
    timeout_micros: u64,
    cancellation_flag: CancellationFlag,
    pending: Option<PendingParse>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            language: None,
            included_ranges: vec![Range::FULL],
            timeout_micros: 0,
            cancellation_flag: CancellationFlag::new(),
            pending: None,
        }
    }

    pub fn with_options(options: ParseOptions) -> Result<Self> {
        let mut parser = Self::new();
        if let Some(timeout) = options.timeout {
            parser.set_timeout(timeout);
        }
        if let Some(ranges) = options.included_ranges {
            parser.set_included_ranges(&ranges)?;
        }
        if let Some(flag) = options.cancellation_flag {
            parser.set_cancellation_flag(flag);
        }
        Ok(parser)
    }

    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    /// Fails without touching the current language when the grammar's ABI
    /// version is outside the supported window.
    pub fn set_language(&mut self, language: Language) -> Result<()> {
        let version = language.version();
        if !(MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
            return Err(Error::LanguageVersionMismatch { version });
        }
        if self.language.as_ref() != Some(&language) {
            self.pending = None;
        }
        self.language = Some(language);
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_micros(self.timeout_micros)
    }

    /// Zero disables the timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout_micros = u64::try_from(timeout.as_micros()).unwrap_or(u64::MAX);
    }

    pub fn timeout_micros(&self) -> u64 {
        self.timeout_micros
    }

    pub fn set_timeout_micros(&mut self, micros: u64) {
        self.timeout_micros = micros;
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancellation_flag.clone()
    }

    pub fn set_cancellation_flag(&mut self, flag: CancellationFlag) {
        self.cancellation_flag = flag;
    }

    pub fn included_ranges(&self) -> &[Range] {
        &self.included_ranges
    }

    /// Restricts parsing to `ranges`, which must be well-formed, ascending
    /// and non-overlapping. An empty slice means the whole document.
    pub fn set_included_ranges(&mut self, ranges: &[Range]) -> Result<()> {
        if ranges.is_empty() {
            self.included_ranges = vec![Range::FULL];
            return Ok(());
        }
        let mut previous_end = 0;
        for (index, range) in ranges.iter().enumerate() {
            if !range.is_well_formed() || range.start_byte < previous_end {
                return Err(Error::InvalidRanges { index });
            }
            previous_end = range.end_byte;
        }
        self.included_ranges = ranges.to_vec();
        Ok(())
    }

    /// Drops any interrupted parse so the next call starts over.
    pub fn reset(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!("discarding interrupted parse");
        }
    }

    /// Parses UTF-8 text.
    ///
    /// `old_tree` must already reflect every edit made to the text since it
    /// was parsed; unchanged parts of it are shared with the result.
    ///
    /// After a timeout or cancellation the next call resumes the interrupted
    /// parse when it is given the same text, and starts over otherwise.
    pub fn parse(&mut self, text: impl AsRef<[u8]>, old_tree: Option<&Tree>) -> Result<Tree> {
        self.parse_with_encoding(text.as_ref(), InputEncoding::Utf8, old_tree)
    }

    pub fn parse_utf16(&mut self, text: &[u16], old_tree: Option<&Tree>) -> Result<Tree> {
        let bytes: Vec<u8> = text.iter().flat_map(|unit| unit.to_le_bytes()).collect();
        self.parse_with_encoding(&bytes, InputEncoding::Utf16, old_tree)
    }

    pub fn parse_with_encoding(
        &mut self,
        text: &[u8],
        encoding: InputEncoding,
        old_tree: Option<&Tree>,
    ) -> Result<Tree> {
        let language = self.language.clone().ok_or(Error::NoLanguage)?;

        let old_tree = old_tree.filter(|tree| {
            let same = tree.language() == &language;
            if !same {
                tracing::warn!(
                    old = tree.language().name(),
                    new = language.name(),
                    "ignoring old tree from a different language"
                );
            }
            same
        });

        let fingerprint = InputFingerprint::new(text, encoding);
        let resumable = self.pending.take().filter(|pending| {
            let same = pending.input == fingerprint;
            if !same {
                tracing::debug!(steps = pending.steps, "input changed, discarding interrupted parse");
            }
            same
        });
        let mut pending = match resumable {
            Some(pending) => {
                tracing::debug!(steps = pending.steps, "resuming interrupted parse");
                pending
            }
            None => {
                tracing::debug!(
                    language = language.name(),
                    bytes = text.len(),
                    ?encoding,
                    incremental = old_tree.is_some(),
                    "starting parse"
                );
                PendingParse {
                    task: language.grammar().start_parse(),
                    builder: TreeBuilder::new(language.clone()),
                    steps: 0,
                    input: fingerprint,
                }
            }
        };

        let input = ParseInput::new(text, encoding, &self.included_ranges, old_tree);
        let deadline = (self.timeout_micros > 0)
            .then(|| Instant::now() + Duration::from_micros(self.timeout_micros));
        let mut since_check = 0;

        loop {
            if since_check == 0 {
                if let Some(error) = self.interruption(deadline) {
                    tracing::debug!(steps = pending.steps, %error, "parse interrupted");
                    self.pending = Some(pending);
                    return Err(error);
                }
                since_check = CHECK_INTERVAL;
            }
            since_check -= 1;
            pending.steps += 1;

            if let ParseStep::Finished(root) = pending.task.advance(&input, &mut pending.builder) {
                let tree = Tree::new(root, language, self.included_ranges.clone());
                tracing::debug!(
                    steps = pending.steps,
                    reused = pending.builder.reused_count(),
                    end = tree.root_node().end_byte(),
                    "parse finished"
                );
                return Ok(tree);
            }
        }
    }

    fn interruption(&self, deadline: Option<Instant>) -> Option<Error> {
        if self.cancellation_flag.is_cancelled() {
            return Some(Error::Cancelled);
        }
        match deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::TimedOut),
            _ => None,
        }
    }
}
