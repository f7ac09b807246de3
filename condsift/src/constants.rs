/// Literal prefix opening a conditional block. The trailing space is part
/// of the prefix: the remainder of the comment is the condition source.
pub const IF_PREFIX: &str = "#if ";
/// Literal prefix for an alternative conditional branch.
pub const ELSEIF_PREFIX: &str = "#elseif ";
/// Literal prefix for the unconditional fallback branch.
pub const ELSE_PREFIX: &str = "#else";
/// Literal prefix closing a conditional block.
pub const ENDIF_PREFIX: &str = "#endif";

/// Dedicated configuration file name, checked before [`FALLBACK_FILENAME`].
pub const CONFIG_FILENAME: &str = ".condsift.toml";
/// Fallback configuration file carrying a `[condsift]` table.
pub const FALLBACK_FILENAME: &str = "Condsift.toml";
