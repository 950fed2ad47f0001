//! Test fixtures.

use crate::context::Context;
use crate::field::{Behaviour, Trial};
use crate::fields;
use uuid::Uuid;

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// Values for every equality field of the standard merge descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIdentity {
    /// CLG tree id.
    pub clg_tree_id: String,
    /// Current behaviour id.
    pub current_behaviour_id: String,
    /// Current behaviour input types.
    pub current_behaviour_input_types: Vec<String>,
    /// Current behaviour name.
    pub current_behaviour_name: String,
    /// Current trial.
    pub current_trial: Trial,
    /// Destination id.
    pub destination_id: String,
    /// Destination name.
    pub destination_name: String,
    /// First behaviour.
    pub first_behaviour: Behaviour,
    /// First information id.
    pub first_information_id: String,
    /// Session id.
    pub session_id: String,
}

impl Default for TestIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl TestIdentity {
    /// Creates an identity with fresh random ids.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clg_tree_id: fresh_id(),
            current_behaviour_id: fresh_id(),
            current_behaviour_input_types: vec!["string".to_string()],
            current_behaviour_name: "scan".to_string(),
            current_trial: Trial::new("trial"),
            destination_id: fresh_id(),
            destination_name: "sum".to_string(),
            first_behaviour: Behaviour::new(fresh_id(), "input").with_input_types(["string"]),
            first_information_id: fresh_id(),
            session_id: fresh_id(),
        }
    }

    /// Writes the identity into `ctx`.
    pub fn apply(&self, ctx: &mut Context) {
        fields::CLG_TREE_ID.new_context(ctx, self.clg_tree_id.clone());
        fields::CURRENT_BEHAVIOUR_ID.new_context(ctx, self.current_behaviour_id.clone());
        fields::CURRENT_BEHAVIOUR_INPUT_TYPES
            .new_context(ctx, self.current_behaviour_input_types.clone());
        fields::CURRENT_BEHAVIOUR_NAME.new_context(ctx, self.current_behaviour_name.clone());
        fields::CURRENT_TRIAL.new_context(ctx, self.current_trial.clone());
        fields::DESTINATION_ID.new_context(ctx, self.destination_id.clone());
        fields::DESTINATION_NAME.new_context(ctx, self.destination_name.clone());
        fields::FIRST_BEHAVIOUR.new_context(ctx, self.first_behaviour.clone());
        fields::FIRST_INFORMATION_ID.new_context(ctx, self.first_information_id.clone());
        fields::SESSION_ID.new_context(ctx, self.session_id.clone());
    }

    /// Creates a background context carrying the identity.
    #[must_use]
    pub fn context(&self) -> Context {
        let mut ctx = Context::background();
        self.apply(&mut ctx);
        ctx
    }
}

/// Creates `count` contexts sharing `identity`.
///
/// Context `i` carries `source-ids = ["s{i+1}"]` and
/// `source-names = ["source-{i+1}"]`.
#[must_use]
pub fn sibling_contexts(identity: &TestIdentity, count: usize) -> Vec<Context> {
    (1..=count)
        .map(|n| {
            let mut ctx = identity.context();
            fields::SOURCE_IDS.new_context(&mut ctx, vec![format!("s{n}")]);
            fields::SOURCE_NAMES.new_context(&mut ctx, vec![format!("source-{n}")]);
            ctx
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identities_are_unique() {
        assert_ne!(TestIdentity::new(), TestIdentity::new());
    }

    #[test]
    fn test_sibling_contexts() {
        let identity = TestIdentity::new();
        let contexts = sibling_contexts(&identity, 3);

        assert_eq!(contexts.len(), 3);
        assert_eq!(
            fields::SOURCE_IDS.from_context(&contexts[2]),
            Some(vec!["s3".to_string()])
        );
        assert_eq!(
            fields::SESSION_ID.from_context(&contexts[0]),
            Some(identity.session_id)
        );
    }
}
