use super::Pass;
use crate::{
    descriptor::{AttributeDescriptor, Introspect, KeyedStrategies},
    error::DesensitizeError,
    node::{ArrayNode, CollectionNode, MapNode, Node, SensitiveValue},
    strategy::{MaskingStrategy, StrategyTable},
};

impl<S: StrategyTable + ?Sized> Pass<'_, S> {
    /// Applies every attribute rule of `entity`, then the flex pass.
    pub(super) fn resolve(&mut self, entity: &mut dyn Introspect) -> Result<(), DesensitizeError> {
        let descriptor = entity.descriptor();
        for (index, attribute) in descriptor.attributes.iter().enumerate() {
            if attribute.constant {
                continue;
            }
            let node = entity.attribute(index)?;
            let hide = match node {
                Node::Null => true,
                _ => !attribute.primitive && attribute.is_null_out(),
            };
            if hide {
                entity.clear_attribute(index)?;
                continue;
            }
            self.apply(attribute, node)?;
        }
        self.resolve_flex(entity)
    }

    fn apply(
        &mut self,
        attribute: &AttributeDescriptor,
        node: Node<'_>,
    ) -> Result<(), DesensitizeError> {
        let simple = attribute.simple_mask();
        match node {
            Node::Null | Node::Scalar => Ok(()),
            Node::Text(text) => {
                if let Some(strategy) = simple {
                    self.mask_text(text, strategy);
                }
                Ok(())
            }
            Node::Collection(collection) => {
                self.descend(|pass| pass.mask_collection(collection, simple))
            }
            Node::Map(map) => {
                let keyed = attribute.map_mask();
                self.descend(|pass| pass.mask_map(map, simple, keyed))
            }
            Node::Array(array) => {
                if array.component_is_primitive() {
                    return Ok(());
                }
                self.descend(|pass| pass.mask_array(array, simple))
            }
            Node::Entity(entity) => self.walk(Node::Entity(entity), None),
        }
    }

    pub(super) fn mask_text(&self, text: &mut dyn SensitiveValue, strategy: MaskingStrategy) {
        let masked = self.table.mask(strategy, text.as_str());
        text.set_masked(masked);
    }

    /// Collects the masked form of every string element; other elements are
    /// walked but not collected. The collection is replaced only when something
    /// was masked, so an untouched collection keeps its elements as they were.
    fn mask_collection(
        &mut self,
        collection: &mut dyn CollectionNode,
        simple: Option<MaskingStrategy>,
    ) -> Result<(), DesensitizeError> {
        let mut masked = Vec::new();
        collection.for_each_element(&mut |element| match (element, simple) {
            (Node::Null, _) => Ok(()),
            (Node::Text(text), Some(strategy)) => {
                masked.push(self.table.mask(strategy, text.as_str()));
                Ok(())
            }
            (element, _) => self.walk(element, None),
        })?;
        if masked.is_empty() {
            return Ok(());
        }
        collection.replace_masked(masked)
    }

    /// String values are masked in place, by the simple strategy when there is
    /// one, else by their key. Entries under unlisted or non-string keys pass
    /// through.
    fn mask_map(
        &mut self,
        map: &mut dyn MapNode,
        simple: Option<MaskingStrategy>,
        keyed: Option<KeyedStrategies>,
    ) -> Result<(), DesensitizeError> {
        map.for_each_entry(&mut |key, value| match value {
            Node::Null => Ok(()),
            Node::Text(text) => {
                let strategy = match (simple, keyed) {
                    (Some(strategy), _) => Some(strategy),
                    (None, Some(keyed)) => key.and_then(|key| keyed.resolve(key)),
                    (None, None) => None,
                };
                if let Some(strategy) = strategy {
                    self.mask_text(text, strategy);
                }
                Ok(())
            }
            value => self.walk(value, None),
        })
    }

    fn mask_array(
        &mut self,
        array: &mut dyn ArrayNode,
        simple: Option<MaskingStrategy>,
    ) -> Result<(), DesensitizeError> {
        array.for_each_element(&mut |element| match (element, simple) {
            (Node::Null, _) => Ok(()),
            (Node::Text(text), Some(strategy)) => {
                self.mask_text(text, strategy);
                Ok(())
            }
            (element, _) => self.walk(element, None),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use crate::{acquire, Desensitize};

    #[derive(Clone, Debug, PartialEq, Desensitize)]
    #[sensitive]
    struct Profile {
        #[sensitive(Username)]
        name: String,
        #[sensitive(Username)]
        aliases: Vec<String>,
        #[sensitive(Username)]
        tags: HashSet<String>,
        #[sensitive(Phone)]
        phones: [String; 2],
        #[sensitive(Password)]
        settings: BTreeMap<String, String>,
        #[sensitive(null)]
        #[sensitive(Username)]
        nickname: Option<String>,
        #[sensitive(null)]
        age: u32,
        notes: Vec<String>,
    }

    fn profile() -> Profile {
        Profile {
            name: "Alice".to_string(),
            aliases: vec!["Al".to_string(), "Ally".to_string()],
            tags: ["vip".to_string()].into(),
            phones: ["1563919868".to_string(), "18254452658".to_string()],
            settings: [("pin".to_string(), "1234".to_string())].into(),
            nickname: Some("ali".to_string()),
            age: 31,
            notes: vec!["kept".to_string()],
        }
    }

    #[test]
    fn every_container_kind_is_masked() {
        let masked = acquire(profile(), None).unwrap();
        assert_eq!(masked.name, "A****");
        assert_eq!(masked.aliases, vec!["A*", "A***"]);
        assert!(masked.tags.contains("v**"));
        assert_eq!(masked.phones, ["15****9868", "182****2658"]);
        assert_eq!(masked.settings["pin"], "[REDACTED]");
        assert_eq!(masked.notes, vec!["kept"]);
    }

    #[test]
    fn null_out_wins_and_spares_primitives() {
        let masked = acquire(profile(), None).unwrap();
        assert_eq!(masked.nickname, None);
        assert_eq!(masked.age, 31);
    }

    #[test]
    fn empty_collections_stay_empty() {
        let mut input = profile();
        input.aliases.clear();
        let masked = acquire(input, None).unwrap();
        assert!(masked.aliases.is_empty());
    }
}
