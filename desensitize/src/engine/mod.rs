//! Traversal and entry points.
//!
//! - **`walker`**: classifies every reachable value and decides which entities
//!   get their attributes resolved.
//! - **`resolver`**: applies attribute rules to one entity.
//! - **`flex`**: the cross-attribute pass that runs after the resolver.
//!
//! [`Desensitizer`] carries the configuration; the free functions use a default
//! instance.

mod flex;
mod resolver;
mod walker;

use crate::{
    descriptor::WrapperClass,
    error::DesensitizeError,
    node::Walk,
    strategy::{DefaultStrategyTable, StrategyTable},
};

/// Nesting limit used by [`Desensitizer::new`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// State of one traversal.
struct Pass<'e, S: ?Sized> {
    table: &'e S,
    max_depth: usize,
    depth: usize,
}

impl<'e, S: StrategyTable + ?Sized> Pass<'e, S> {
    fn new(table: &'e S, max_depth: usize) -> Self {
        Self {
            table,
            max_depth,
            depth: 0,
        }
    }
}

/// A configured masking engine.
///
/// ```
/// use desensitize::{Desensitizer, MaskingStrategy};
///
/// let engine = Desensitizer::new()
///     .with_table(|_: MaskingStrategy, input: &str| "#".repeat(input.len()))
///     .with_max_depth(32);
/// let masked = engine.acquire_or_original(vec!["kept".to_string()]);
/// assert_eq!(masked, vec!["kept"]);
/// ```
#[derive(Clone, Debug)]
pub struct Desensitizer<S = DefaultStrategyTable> {
    table: S,
    max_depth: usize,
    #[cfg(feature = "slog")]
    logger: Option<::slog::Logger>,
}

impl Desensitizer {
    /// An engine using [`DefaultStrategyTable`] and [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: DefaultStrategyTable,
            max_depth: DEFAULT_MAX_DEPTH,
            #[cfg(feature = "slog")]
            logger: None,
        }
    }
}

impl Default for Desensitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StrategyTable> Desensitizer<S> {
    /// Uses `table` to turn strategies into masked text.
    #[must_use]
    pub fn with_table<T: StrategyTable>(self, table: T) -> Desensitizer<T> {
        Desensitizer {
            table,
            max_depth: self.max_depth,
            #[cfg(feature = "slog")]
            logger: self.logger,
        }
    }

    /// Fails with [`DesensitizeError::DepthExceeded`] past `max_depth` nested
    /// containers and entities.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Records a warning whenever [`Desensitizer::acquire_or_original`]
    /// falls back to the original value.
    #[cfg(feature = "slog")]
    #[must_use]
    pub fn with_logger(mut self, logger: ::slog::Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The strategy table in use.
    pub fn table(&self) -> &S {
        &self.table
    }

    /// Masks `value` in place.
    ///
    /// `wrapper` opts unmarked entities of that type into masking. On error the
    /// graph may be partially masked.
    pub fn acquire_in_place<T: Walk>(
        &self,
        value: &mut T,
        wrapper: Option<WrapperClass>,
    ) -> Result<(), DesensitizeError> {
        Pass::new(&self.table, self.max_depth).walk(value.node(), wrapper)
    }

    /// Masks `value` and hands it back, or surfaces the first failure.
    pub fn acquire<T: Walk>(
        &self,
        mut value: T,
        wrapper: Option<WrapperClass>,
    ) -> Result<T, DesensitizeError> {
        self.acquire_in_place(&mut value, wrapper)?;
        Ok(value)
    }

    /// Masks `value`, returning it untouched if anything fails.
    ///
    /// The work happens on a clone, so a failure never leaks a partially
    /// masked graph.
    pub fn acquire_or_original<T: Walk + Clone>(&self, value: T) -> T {
        self.masked_or(value, None)
    }

    /// [`Desensitizer::acquire_or_original`] with a wrapper type.
    pub fn acquire_or_original_with<T: Walk + Clone>(&self, value: T, wrapper: WrapperClass) -> T {
        self.masked_or(value, Some(wrapper))
    }

    fn masked_or<T: Walk + Clone>(&self, value: T, wrapper: Option<WrapperClass>) -> T {
        let mut working = value.clone();
        match self.acquire_in_place(&mut working, wrapper) {
            Ok(()) => working,
            Err(error) => {
                self.report_fallback(&error, wrapper);
                value
            }
        }
    }

    #[cfg_attr(not(feature = "slog"), allow(clippy::unused_self, unused_variables))]
    fn report_fallback(&self, error: &DesensitizeError, wrapper: Option<WrapperClass>) {
        #[cfg(feature = "slog")]
        if let Some(logger) = &self.logger {
            ::slog::warn!(
                logger,
                "masking failed, returning the original value";
                "error" => %error,
                "wrapper" => wrapper.map(|wrapper| wrapper.type_name())
            );
        }
    }
}

/// Masks `value` in place with the default engine.
pub fn acquire_in_place<T: Walk>(
    value: &mut T,
    wrapper: Option<WrapperClass>,
) -> Result<(), DesensitizeError> {
    Desensitizer::new().acquire_in_place(value, wrapper)
}

/// Masks `value` with the default engine, surfacing failures.
pub fn acquire<T: Walk>(value: T, wrapper: Option<WrapperClass>) -> Result<T, DesensitizeError> {
    Desensitizer::new().acquire(value, wrapper)
}

/// Masks `value` with the default engine; returns it untouched on failure.
#[must_use]
pub fn acquire_or_original<T: Walk + Clone>(value: T) -> T {
    Desensitizer::new().acquire_or_original(value)
}

/// [`acquire_or_original`] with a wrapper type.
#[must_use]
pub fn acquire_or_original_with<T: Walk + Clone>(value: T, wrapper: WrapperClass) -> T {
    Desensitizer::new().acquire_or_original_with(value, wrapper)
}

/// Method-call form of the free functions.
///
/// Blanket-implemented for every [`Walk`] type.
pub trait Desensitizable: Walk + Sized {
    /// See [`acquire_or_original`].
    #[must_use]
    fn desensitized(self) -> Self
    where
        Self: Clone,
    {
        acquire_or_original(self)
    }

    /// See [`acquire_or_original_with`].
    #[must_use]
    fn desensitized_within(self, wrapper: WrapperClass) -> Self
    where
        Self: Clone,
    {
        acquire_or_original_with(self, wrapper)
    }

    /// See [`acquire_in_place`].
    fn desensitize_in_place(&mut self) -> Result<(), DesensitizeError> {
        acquire_in_place(self, None)
    }
}

impl<T> Desensitizable for T where T: Walk {}
