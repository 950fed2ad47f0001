//! Registry of the fields carried by a pipeline context.
//!
//! Every key used by the pipeline is declared here once. Backup keys are
//! derived as `<key>/restore`.

use crate::field::{Behaviour, Expectation, Field, Trial};

/// Id of the CLG tree the request executes in.
pub const CLG_TREE_ID: Field<String> = crate::field!("clg-tree-id", "clg tree id");

/// Id of the behaviour currently executed.
pub const CURRENT_BEHAVIOUR_ID: Field<String> =
    crate::field!("current-behaviour-id", "current behaviour id");

/// Input types of the behaviour currently executed.
pub const CURRENT_BEHAVIOUR_INPUT_TYPES: Field<Vec<String>> =
    crate::field!("current-behaviour-input-types", "current behaviour input types");

/// Name of the behaviour currently executed.
pub const CURRENT_BEHAVIOUR_NAME: Field<String> =
    crate::field!("current-behaviour-name", "current behaviour name");

/// Scope of the trial currently executed.
pub const CURRENT_TRIAL: Field<Trial> = crate::field!("current-trial", "current trial");

/// Id of the behaviour the request is forwarded to.
pub const DESTINATION_ID: Field<String> = crate::field!("destination-id", "destination id");

/// Name of the behaviour the request is forwarded to.
pub const DESTINATION_NAME: Field<String> = crate::field!("destination-name", "destination name");

/// Expected outcome of the request. Optional.
pub const EXPECTATION: Field<Expectation> = crate::field!("expectation", "expectation");

/// The behaviour that received the request first.
pub const FIRST_BEHAVIOUR: Field<Behaviour> = crate::field!("first-behaviour", "first behaviour");

/// Id of the information that started the request.
pub const FIRST_INFORMATION_ID: Field<String> =
    crate::field!("first-information-id", "first information id");

/// Id of the session the request belongs to.
pub const SESSION_ID: Field<String> = crate::field!("session-id", "session id");

/// Ids of the behaviours that forwarded into the current one.
pub const SOURCE_IDS: Field<Vec<String>> = crate::field!("source-ids", "source ids");

/// Names of the behaviours that forwarded into the current one.
pub const SOURCE_NAMES: Field<Vec<String>> = crate::field!("source-names", "source names");

/// All registered primary keys.
pub const KEYS: &[&str] = &[
    CLG_TREE_ID.key(),
    CURRENT_BEHAVIOUR_ID.key(),
    CURRENT_BEHAVIOUR_INPUT_TYPES.key(),
    CURRENT_BEHAVIOUR_NAME.key(),
    CURRENT_TRIAL.key(),
    DESTINATION_ID.key(),
    DESTINATION_NAME.key(),
    EXPECTATION.key(),
    FIRST_BEHAVIOUR.key(),
    FIRST_INFORMATION_ID.key(),
    SESSION_ID.key(),
    SOURCE_IDS.key(),
    SOURCE_NAMES.key(),
];
