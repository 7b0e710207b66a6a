//! Masking strategies and the table that turns them into masked text.
//!
//! The engine only ever asks a [`StrategyTable`] for `mask(strategy, input)`.
//! What each strategy does to a string is the table's business.

use crate::policy::TextPolicy;

/// Tag selecting a masking algorithm.
///
/// Field attributes name these variants, e.g. `#[sensitive(Email)]`.
/// [`MaskingStrategy::Default`] is the zero strategy used whenever a rule's
/// strategy list is shorter than its key list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaskingStrategy {
    /// Hide the value entirely.
    #[default]
    Default,
    /// Personal names and account handles.
    Username,
    /// Passwords and other secrets.
    Password,
    /// Email addresses.
    Email,
    /// Phone numbers.
    Phone,
    /// Government-issued identity numbers.
    IdCard,
    /// Bank card numbers.
    BankCard,
    /// Postal addresses.
    Address,
}

impl MaskingStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Default,
        Self::Username,
        Self::Password,
        Self::Email,
        Self::Phone,
        Self::IdCard,
        Self::BankCard,
        Self::Address,
    ];

    /// Picks `strategies[index]`, or [`MaskingStrategy::Default`] when the list
    /// is too short.
    #[must_use]
    pub fn at(strategies: &[Self], index: usize) -> Self {
        strategies.get(index).copied().unwrap_or_default()
    }

    /// The policy [`DefaultStrategyTable`] applies for this strategy.
    #[must_use]
    pub fn policy(self) -> TextPolicy {
        match self {
            Self::Default | Self::Password => TextPolicy::hide(),
            Self::Username => TextPolicy::keep_first(1),
            Self::Email => TextPolicy::Email,
            Self::Phone => TextPolicy::tail(4, 4),
            Self::IdCard => TextPolicy::keep_both(4, 4),
            Self::BankCard => TextPolicy::keep_both(6, 4),
            Self::Address => TextPolicy::keep_first(6),
        }
    }
}

/// Maps a strategy and an input string to the masked string.
///
/// Implementations must be total over every strategy and every input
/// (including the empty string) and deterministic.
pub trait StrategyTable {
    /// Masks `input` according to `strategy`.
    fn mask(&self, strategy: MaskingStrategy, input: &str) -> String;
}

impl<F> StrategyTable for F
where
    F: Fn(MaskingStrategy, &str) -> String,
{
    fn mask(&self, strategy: MaskingStrategy, input: &str) -> String {
        self(strategy, input)
    }
}

/// The built-in table: applies [`MaskingStrategy::policy`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultStrategyTable;

impl StrategyTable for DefaultStrategyTable {
    fn mask(&self, strategy: MaskingStrategy, input: &str) -> String {
        strategy.policy().apply_to(input)
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultStrategyTable, MaskingStrategy, StrategyTable};
    use crate::policy::HIDDEN_PLACEHOLDER;

    #[test]
    fn default_table_masks_known_shapes() {
        let table = DefaultStrategyTable;
        assert_eq!(table.mask(MaskingStrategy::Default, "12345"), HIDDEN_PLACEHOLDER);
        assert_eq!(table.mask(MaskingStrategy::Password, "ssp"), HIDDEN_PLACEHOLDER);
        assert_eq!(table.mask(MaskingStrategy::Username, "田晓霞"), "田**");
        assert_eq!(
            table.mask(MaskingStrategy::Email, "1563919868@qq.com"),
            "1***8@qq.com"
        );
        assert_eq!(table.mask(MaskingStrategy::Phone, "1563919868"), "15****9868");
        assert_eq!(
            table.mask(MaskingStrategy::IdCard, "321455188625645686"),
            "3214**********5686"
        );
        assert_eq!(
            table.mask(MaskingStrategy::BankCard, "325648956125656666"),
            "325648********6666"
        );
        assert_eq!(
            table.mask(MaskingStrategy::Address, "1 Infinite Loop"),
            "1 Infi*********"
        );
    }

    #[test]
    fn every_strategy_accepts_empty_input() {
        let table = DefaultStrategyTable;
        for strategy in MaskingStrategy::ALL {
            let first = table.mask(strategy, "");
            assert_eq!(first, table.mask(strategy, ""));
        }
    }

    #[test]
    fn out_of_range_index_falls_back_to_default() {
        let strategies = [MaskingStrategy::Email];
        assert_eq!(MaskingStrategy::at(&strategies, 0), MaskingStrategy::Email);
        assert_eq!(MaskingStrategy::at(&strategies, 1), MaskingStrategy::Default);
        assert_eq!(MaskingStrategy::at(&[], 0), MaskingStrategy::Default);
    }

    #[test]
    fn closures_are_tables() {
        let table = |strategy: MaskingStrategy, input: &str| format!("{strategy:?}:{input}");
        assert_eq!(table.mask(MaskingStrategy::Phone, "1"), "Phone:1");
    }
}
