//! exit codes for rulekit commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// no rule with the given name or id
pub const RULE_NOT_FOUND: i32 = 2;

/// rule string failed to parse
pub const PARSE_ERROR: i32 = 3;

/// record incompatible with the rule (missing field, type mismatch)
pub const EVAL_ERROR: i32 = 4;

/// evaluation completed and at least one rule did not pass
pub const RULE_FAILED: i32 = 5;

/// invalid command-line arguments or record data
pub const INVALID_ARGS: i32 = 6;

/// configuration file error
pub const CONFIG_ERROR: i32 = 7;
