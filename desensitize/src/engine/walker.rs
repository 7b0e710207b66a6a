use super::Pass;
use crate::{
    descriptor::WrapperClass, error::DesensitizeError, node::Node, strategy::StrategyTable,
};

impl<S: StrategyTable + ?Sized> Pass<'_, S> {
    /// Visits `node`, resolving every entity that is marked or matches
    /// `wrapper`.
    ///
    /// Text reached here is never masked: only a declaring attribute can carry
    /// a strategy.
    pub(super) fn walk(
        &mut self,
        node: Node<'_>,
        wrapper: Option<WrapperClass>,
    ) -> Result<(), DesensitizeError> {
        match node {
            Node::Null | Node::Scalar | Node::Text(_) => Ok(()),
            Node::Collection(collection) => self.descend(|pass| {
                collection.for_each_element(&mut |element| pass.walk(element, wrapper))
            }),
            Node::Map(map) => {
                self.descend(|pass| map.for_each_entry(&mut |_, value| pass.walk(value, wrapper)))
            }
            Node::Array(array) => {
                if array.component_is_primitive() {
                    return Ok(());
                }
                self.descend(|pass| {
                    array.for_each_element(&mut |element| pass.walk(element, wrapper))
                })
            }
            Node::Entity(entity) => {
                let descriptor = entity.descriptor();
                let selected = descriptor.marked
                    || wrapper.is_some_and(|wrapper| wrapper.matches(descriptor));
                if selected {
                    self.descend(|pass| pass.resolve(entity))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Runs `step` one level deeper, failing once the depth limit is reached.
    pub(super) fn descend<F>(&mut self, step: F) -> Result<(), DesensitizeError>
    where
        F: FnOnce(&mut Self) -> Result<(), DesensitizeError>,
    {
        if self.depth >= self.max_depth {
            return Err(DesensitizeError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let outcome = step(self);
        self.depth -= 1;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::{
        acquire, acquire_in_place, Desensitize, DesensitizeError, Desensitizer, WrapperClass,
    };

    #[derive(Clone, Debug, PartialEq, Desensitize)]
    #[sensitive]
    struct Account {
        #[sensitive(Password)]
        secret: String,
    }

    #[derive(Clone, Debug, PartialEq, Desensitize)]
    struct Plain {
        #[sensitive(Password)]
        secret: String,
    }

    fn account() -> Account {
        Account {
            secret: "hunter2".to_string(),
        }
    }

    #[test]
    fn marked_entities_inside_containers_are_resolved() {
        let mut by_id = HashMap::new();
        by_id.insert(1_u32, vec![account()]);
        acquire_in_place(&mut by_id, None).unwrap();
        assert_eq!(by_id[&1][0].secret, "[REDACTED]");
    }

    #[test]
    fn unmarked_entities_are_opaque_without_wrapper() {
        let plain = Plain {
            secret: "hunter2".to_string(),
        };
        let walked = acquire(plain.clone(), None).unwrap();
        assert_eq!(walked, plain);

        let walked = acquire(plain, Some(WrapperClass::of::<Plain>())).unwrap();
        assert_eq!(walked.secret, "[REDACTED]");
    }

    #[test]
    fn wrapper_of_another_type_does_not_select() {
        let plain = Plain {
            secret: "hunter2".to_string(),
        };
        let walked = acquire(plain.clone(), Some(WrapperClass::of::<Account>())).unwrap();
        assert_eq!(walked, plain);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let nested = vec![vec![vec![account()]]];
        let engine = Desensitizer::new().with_max_depth(3);
        let result = engine.acquire(nested.clone(), None);
        assert!(matches!(
            result,
            Err(DesensitizeError::DepthExceeded { limit: 3 })
        ));

        let walked = Desensitizer::new().with_max_depth(4).acquire(nested, None).unwrap();
        assert_eq!(walked[0][0][0].secret, "[REDACTED]");
    }

    #[test]
    fn primitive_arrays_are_skipped() {
        let mut numbers = [1_u8, 2, 3];
        acquire_in_place(&mut numbers, None).unwrap();
        assert_eq!(numbers, [1, 2, 3]);
    }
}
