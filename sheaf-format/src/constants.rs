//! Constants shared across the Sheaf crates

/// Default delimiter between tokens of a flattened field path.
pub const DEFAULT_PATH_DELIMITER: char = '.';
/// Alternate delimiter used by underscore-flattened descriptors.
pub const UNDERSCORE_PATH_DELIMITER: char = '_';

/// Declared type attached to intermediate (non-leaf) schema nodes.
pub const GROUP_TYPE_NAME: &str = "group";

/// Separator between entries of a filter configuration string.
pub const FILTER_ENTRY_SEPARATOR: char = ',';
/// Separator between the namespace id and the branch path of a filter entry.
pub const FILTER_NAMESPACE_SEPARATOR: char = '/';
/// Delimiter between tokens of a filter branch path.
pub const FILTER_BRANCH_DELIMITER: char = '.';

/// Source type name for UTF-8 strings.
pub const SOURCE_STRING: &str = "string";
/// Source type name for 64-bit integers.
pub const SOURCE_LONG: &str = "long";
/// Source type name for calendar dates (passed through as strings).
pub const SOURCE_DATE: &str = "date";
/// Source type name for timestamps.
pub const SOURCE_DATE_TIME: &str = "date-time";
/// Source type name for 32-bit integers.
pub const SOURCE_INTEGER: &str = "integer";
/// Short alias for [`SOURCE_INTEGER`].
pub const SOURCE_INT: &str = "int";
/// Source type name for 8-bit integers.
pub const SOURCE_BYTE: &str = "byte";
/// Source type name for 16-bit integers.
pub const SOURCE_SHORT: &str = "short";
/// Source type name for generic numbers (mapped to double).
pub const SOURCE_NUMBER: &str = "number";
/// Source type name for double precision floats.
pub const SOURCE_DOUBLE: &str = "double";
/// Source type name for single precision floats.
pub const SOURCE_FLOAT: &str = "float";
/// Source type name for booleans.
pub const SOURCE_BOOLEAN: &str = "boolean";
/// Source type name for opaque binary payloads.
pub const SOURCE_BINARY: &str = "binary";
