//! Per-task pool of reusable parsers

use super::context::ParseContext;
use super::json::JsonParser;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Hands out [`JsonParser`]s that share one [`ParseContext`].
///
/// Workers check a parser out for the duration of a task; it goes back to the
/// free list when the guard drops.
#[derive(Debug)]
pub struct ParserPool {
    context: Arc<ParseContext>,
    idle: Mutex<Vec<JsonParser>>,
    created: AtomicUsize,
}

impl Default for ParserPool {
    fn default() -> Self {
        Self::new(ParseContext::default())
    }
}

impl ParserPool {
    /// Create an empty pool
    pub fn new(context: ParseContext) -> Self {
        Self::with_shared_context(Arc::new(context))
    }

    /// Create an empty pool around an already shared context
    pub fn with_shared_context(context: Arc<ParseContext>) -> Self {
        Self {
            context,
            idle: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
        }
    }

    /// Check out a parser, creating one if none is idle
    pub fn get(&self) -> PooledParser<'_> {
        let parser = self.idle.lock().pop().unwrap_or_else(|| {
            self.created.fetch_add(1, Ordering::Relaxed);
            JsonParser::new(Arc::clone(&self.context))
        });
        PooledParser {
            pool: self,
            parser: Some(parser),
        }
    }

    pub fn context(&self) -> &Arc<ParseContext> {
        &self.context
    }

    /// Parsers created over the pool's lifetime
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// Parsers currently checked in
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }
}

/// A parser checked out of a [`ParserPool`].
///
/// The record it last parsed is released when it goes back to the pool.
#[derive(Debug)]
pub struct PooledParser<'a> {
    pool: &'a ParserPool,
    // Some until drop
    parser: Option<JsonParser>,
}

impl Deref for PooledParser<'_> {
    type Target = JsonParser;

    fn deref(&self) -> &Self::Target {
        self.parser.as_ref().expect("parser is checked out until drop")
    }
}

impl DerefMut for PooledParser<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.parser.as_mut().expect("parser is checked out until drop")
    }
}

impl Drop for PooledParser<'_> {
    fn drop(&mut self) {
        if let Some(mut parser) = self.parser.take() {
            parser.clear();
            self.pool.idle.lock().push(parser);
        }
    }
}
