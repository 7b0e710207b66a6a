use super::Pass;
use crate::{
    descriptor::Introspect, error::DesensitizeError, node::Node, strategy::StrategyTable,
};

impl<S: StrategyTable + ?Sized> Pass<'_, S> {
    /// Masks flex targets, using each flex attribute's own value as the key.
    ///
    /// Runs after the attribute pass, so a target already masked there is
    /// masked again. Every unmet precondition skips just that rule.
    pub(super) fn resolve_flex(&self, entity: &mut dyn Introspect) -> Result<(), DesensitizeError> {
        let descriptor = entity.descriptor();
        for (index, attribute) in descriptor.attributes.iter().enumerate() {
            let Some((target, keyed)) = attribute.flex_mask() else {
                continue;
            };
            let key = match entity.attribute(index)? {
                Node::Text(text) => text.as_str().to_owned(),
                _ => continue,
            };
            let Some(target_index) = descriptor.position(target) else {
                continue;
            };
            let Node::Text(value) = entity.attribute(target_index)? else {
                continue;
            };
            let Some(strategy) = keyed.resolve(&key) else {
                continue;
            };
            self.mask_text(value, strategy);
        }
        Ok(())
    }
}
