//! Text masking policies.
//!
//! Policies are pure string transformations. They do not traverse graphs or
//! decide which strategy applies; [`crate::strategy`] maps strategies onto them.

use std::borrow::Cow;

/// Placeholder written by [`TextPolicy::Hide`] when none is configured.
pub const HIDDEN_PLACEHOLDER: &str = "[REDACTED]";

/// Keeps a visible prefix and suffix and masks everything in between.
///
/// Operates on Unicode scalar values. When the visible spans cover the whole
/// value, the value is returned unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepConfig {
    visible_prefix: usize,
    visible_suffix: usize,
    mask_char: char,
}

impl KeepConfig {
    /// Keeps only the first `visible_prefix` characters.
    #[must_use]
    pub fn first(visible_prefix: usize) -> Self {
        Self::both(visible_prefix, 0)
    }

    /// Keeps only the last `visible_suffix` characters.
    #[must_use]
    pub fn last(visible_suffix: usize) -> Self {
        Self::both(0, visible_suffix)
    }

    /// Keeps `visible_prefix` leading and `visible_suffix` trailing characters.
    #[must_use]
    pub fn both(visible_prefix: usize, visible_suffix: usize) -> Self {
        Self {
            visible_prefix,
            visible_suffix,
            mask_char: '*',
        }
    }

    /// Uses a specific masking character.
    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    fn apply_to(&self, value: &str) -> String {
        let total = value.chars().count();
        if self.visible_prefix + self.visible_suffix >= total {
            return value.to_owned();
        }
        let hidden_until = total - self.visible_suffix;
        value
            .chars()
            .enumerate()
            .map(|(index, ch)| {
                if index < self.visible_prefix || index >= hidden_until {
                    ch
                } else {
                    self.mask_char
                }
            })
            .collect()
    }
}

/// Masks a fixed-width window directly in front of a visible suffix.
///
/// `15****9868` is `TailConfig::new(4, 4)` applied to `1563919868`. Characters
/// in front of the window stay visible; values no longer than the suffix are
/// masked entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TailConfig {
    visible_suffix: usize,
    masked: usize,
    mask_char: char,
}

impl TailConfig {
    /// Masks `masked` characters in front of the last `visible_suffix` characters.
    #[must_use]
    pub fn new(visible_suffix: usize, masked: usize) -> Self {
        Self {
            visible_suffix,
            masked,
            mask_char: '*',
        }
    }

    /// Uses a specific masking character.
    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    fn apply_to(&self, value: &str) -> String {
        let total = value.chars().count();
        if total <= self.visible_suffix {
            return self.mask_char.to_string().repeat(total);
        }
        let window_end = total - self.visible_suffix;
        let window_start = window_end.saturating_sub(self.masked);
        value
            .chars()
            .enumerate()
            .map(|(index, ch)| {
                if (window_start..window_end).contains(&index) {
                    self.mask_char
                } else {
                    ch
                }
            })
            .collect()
    }
}

/// A masking policy for string values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextPolicy {
    /// Replace the whole value with a placeholder.
    Hide {
        /// Text written in place of the value.
        placeholder: Cow<'static, str>,
    },
    /// Keep configured segments visible, mask the rest.
    Keep(KeepConfig),
    /// Mask a window in front of a visible suffix.
    Tail(TailConfig),
    /// Keep the first and last character of the local part and the whole
    /// domain of an email address: `1563919868@qq.com` becomes `1***8@qq.com`.
    ///
    /// Values without `@` fall back to keeping their first character.
    Email,
}

impl TextPolicy {
    /// [`TextPolicy::Hide`] with [`HIDDEN_PLACEHOLDER`].
    #[must_use]
    pub fn hide() -> Self {
        Self::Hide {
            placeholder: Cow::Borrowed(HIDDEN_PLACEHOLDER),
        }
    }

    /// [`TextPolicy::Hide`] with a custom placeholder.
    #[must_use]
    pub fn hide_with<P>(placeholder: P) -> Self
    where
        P: Into<Cow<'static, str>>,
    {
        Self::Hide {
            placeholder: placeholder.into(),
        }
    }

    /// Keeps the first `visible_prefix` characters.
    #[must_use]
    pub fn keep_first(visible_prefix: usize) -> Self {
        Self::Keep(KeepConfig::first(visible_prefix))
    }

    /// Keeps the last `visible_suffix` characters.
    #[must_use]
    pub fn keep_last(visible_suffix: usize) -> Self {
        Self::Keep(KeepConfig::last(visible_suffix))
    }

    /// Keeps both ends visible.
    #[must_use]
    pub fn keep_both(visible_prefix: usize, visible_suffix: usize) -> Self {
        Self::Keep(KeepConfig::both(visible_prefix, visible_suffix))
    }

    /// Masks `masked` characters in front of the last `visible_suffix`.
    #[must_use]
    pub fn tail(visible_suffix: usize, masked: usize) -> Self {
        Self::Tail(TailConfig::new(visible_suffix, masked))
    }

    /// Applies the policy. Total: never fails, empty input included.
    #[must_use]
    pub fn apply_to(&self, value: &str) -> String {
        match self {
            Self::Hide { placeholder } => placeholder.clone().into_owned(),
            Self::Keep(config) => config.apply_to(value),
            Self::Tail(config) => config.apply_to(value),
            Self::Email => mask_email(value),
        }
    }
}

impl Default for TextPolicy {
    fn default() -> Self {
        Self::hide()
    }
}

fn mask_email(value: &str) -> String {
    let Some((local, domain)) = value.split_once('@') else {
        return KeepConfig::first(1).apply_to(value);
    };
    let mut chars = local.chars();
    let mut masked = String::with_capacity(value.len() + 3);
    if let Some(first) = chars.next() {
        masked.push(first);
    }
    masked.push_str("***");
    if let Some(last) = chars.next_back() {
        masked.push(last);
    }
    masked.push('@');
    masked.push_str(domain);
    masked
}

#[cfg(test)]
mod tests {
    use super::{KeepConfig, TailConfig, TextPolicy, HIDDEN_PLACEHOLDER};

    #[test]
    fn hide_ignores_input() {
        assert_eq!(TextPolicy::hide().apply_to("secret"), HIDDEN_PLACEHOLDER);
        assert_eq!(TextPolicy::hide().apply_to(""), HIDDEN_PLACEHOLDER);
        assert_eq!(TextPolicy::hide_with("--").apply_to("secret"), "--");
    }

    #[test]
    fn keep_masks_the_middle() {
        assert_eq!(TextPolicy::keep_first(1).apply_to("田晓霞"), "田**");
        assert_eq!(TextPolicy::keep_last(2).apply_to("abcdef"), "****ef");
        assert_eq!(TextPolicy::keep_both(2, 2).apply_to("abcdef"), "ab**ef");
    }

    #[test]
    fn keep_leaves_short_values_alone() {
        assert_eq!(TextPolicy::keep_both(2, 2).apply_to("abcd"), "abcd");
        assert_eq!(TextPolicy::keep_first(3).apply_to("ab"), "ab");
        assert_eq!(TextPolicy::keep_first(3).apply_to(""), "");
    }

    #[test]
    fn keep_respects_mask_char() {
        let policy = TextPolicy::Keep(KeepConfig::first(2).with_mask_char('#'));
        assert_eq!(policy.apply_to("abcdef"), "ab####");
    }

    #[test]
    fn tail_masks_window_before_suffix() {
        assert_eq!(TextPolicy::tail(4, 4).apply_to("1563919868"), "15****9868");
        assert_eq!(TextPolicy::tail(4, 4).apply_to("18254452658"), "182****2658");
        assert_eq!(TextPolicy::tail(4, 4).apply_to("1234567"), "***4567");
        assert_eq!(TextPolicy::tail(4, 4).apply_to("123"), "***");
        assert_eq!(TextPolicy::tail(4, 4).apply_to(""), "");
    }

    #[test]
    fn tail_respects_mask_char() {
        let policy = TextPolicy::Tail(TailConfig::new(2, 2).with_mask_char('x'));
        assert_eq!(policy.apply_to("abcdef"), "abxxef");
    }

    #[test]
    fn email_keeps_domain() {
        assert_eq!(TextPolicy::Email.apply_to("1563919868@qq.com"), "1***8@qq.com");
        assert_eq!(TextPolicy::Email.apply_to("a@b.io"), "a***@b.io");
        assert_eq!(TextPolicy::Email.apply_to("@b.io"), "***@b.io");
    }

    #[test]
    fn email_without_at_keeps_first_char() {
        assert_eq!(TextPolicy::Email.apply_to("plain"), "p****");
        assert_eq!(TextPolicy::Email.apply_to(""), "");
    }

    #[test]
    fn policies_are_deterministic() {
        let policy = TextPolicy::keep_last(4);
        assert_eq!(policy.apply_to("sensitive"), policy.apply_to("sensitive"));
    }
}
